//! Login form example: one section whose rows are swapped between a login
//! and a registration form.
//!
//! Clearing the section and adding the new fields in the same commit turns
//! rows that keep their slot into reloads; only the surplus rows are
//! inserted or deleted.
//!
//! Run with: cargo run -p tableflow --example login_form

use std::sync::Arc;

use tableflow::binding::{DataSource, ListBinding, RecyclerView};
use tableflow::model::{AdapterConfig, BatchOperation, ContentAdapter, IndexPath, Section};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
default_row_animation = "fade"
default_section_animation = "automatic"
"#;

#[derive(Debug, Clone, PartialEq)]
struct TextField {
    title: &'static str,
    text: Option<String>,
    secure: bool,
}

impl TextField {
    fn plain(title: &'static str, text: Option<String>) -> Self {
        Self {
            title,
            text,
            secure: false,
        }
    }

    fn secure(title: &'static str) -> Self {
        Self {
            title,
            text: None,
            secure: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Buttons {
    primary: &'static str,
    secondary: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Login,
    Register,
}

/// Prints every batch it is asked to animate.
struct ConsoleTable;

impl RecyclerView for ConsoleTable {
    type Cell = String;
    type HeaderFooter = String;

    fn dequeue_reusable_cell(&self, reuse_identifier: &str) -> Option<String> {
        Some(format!("  [{reuse_identifier}] "))
    }

    fn dequeue_reusable_header_footer(&self, _reuse_identifier: &str) -> Option<String> {
        Some(String::from("  "))
    }

    fn perform_batch_updates(&self, operations: &[BatchOperation]) {
        println!("batch:");
        for operation in operations {
            println!("    {operation:?}");
        }
    }
}

struct LoginForm {
    adapter: ContentAdapter,
    section: Section,
    mode: Mode,
    email: Option<String>,
}

impl LoginForm {
    fn new(config: AdapterConfig) -> Self {
        let adapter = ContentAdapter::with_config(config);
        let section = Section::new();
        section.set_header("Welcome");
        adapter.add(section.clone());
        adapter.commit();
        Self {
            adapter,
            section,
            mode: Mode::Login,
            email: Some("ada@example.com".into()),
        }
    }

    fn show(&mut self, mode: Mode) {
        let animation = self.adapter.config().default_row_animation;
        self.mode = mode;
        self.section.clear(animation);
        match mode {
            Mode::Login => {
                self.section.set_footer(Buttons {
                    primary: "Login",
                    secondary: "Register",
                });
                self.section
                    .add(TextField::plain("E-Mail", self.email.clone()), animation);
                self.section.add(TextField::secure("Password"), animation);
            }
            Mode::Register => {
                self.section.set_footer(Buttons {
                    primary: "Register",
                    secondary: "Back to login",
                });
                self.section
                    .add(TextField::plain("E-Mail", self.email.clone()), animation);
                self.section.add(TextField::plain("Firstname", None), animation);
                self.section.add(TextField::plain("Lastname", None), animation);
            }
        }
        self.adapter.commit();
    }

    fn toggle(&mut self) {
        match self.mode {
            Mode::Login => self.show(Mode::Register),
            Mode::Register => self.show(Mode::Login),
        }
    }
}

fn draw(binding: &ListBinding<ConsoleTable>) {
    for section in 0..binding.number_of_sections() {
        if let Some(header) = binding.header_view(section) {
            println!("{header}");
        }
        for row in 0..binding.number_of_rows(section) {
            if let Some(cell) = binding.cell_for_row(IndexPath::new(section, row)) {
                println!("{cell}");
            }
        }
        if let Some(footer) = binding.footer_view(section) {
            println!("{footer}");
        }
    }
    println!();
}

fn main() -> tableflow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tableflow=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AdapterConfig::from_toml_str(CONFIG)?;
    let mut form = LoginForm::new(config);

    let binding = ListBinding::new(Arc::new(ConsoleTable));
    binding.register_cell::<TextField, _>(|cell, field| {
        let text = match (&field.text, field.secure) {
            (_, true) => "********".to_owned(),
            (Some(text), false) => text.clone(),
            (None, false) => String::new(),
        };
        cell.push_str(&format!("{}: {text}", field.title));
    });
    binding.register_header_footer::<&'static str, _>(|view, title| view.push_str(title));
    binding.register_header_footer::<Buttons, _>(|view, buttons| {
        view.push_str(&format!("({}) ({})", buttons.primary, buttons.secondary));
    });
    binding.set_content_adapter(Some(form.adapter.clone()));

    form.show(Mode::Login);
    draw(&binding);

    form.toggle();
    draw(&binding);

    form.toggle();
    draw(&binding);

    Ok(())
}

//! Animation hints attached to every pending operation.

use serde::{Deserialize, Serialize};

/// How a view should animate an inserted, deleted, reloaded or moved item.
///
/// The engine never interprets the hint; it is carried alongside each
/// operation so the view can pick a matching native animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    /// Cross-fade the item.
    Fade,
    /// Slide in from (or out to) the right.
    SlideRight,
    /// Slide in from (or out to) the left.
    SlideLeft,
    /// Slide in from (or out to) the bottom.
    SlideBottom,
    /// No animation.
    None,
    /// Keep the item centered in the space it will/did occupy.
    Middle,
    /// Let the view choose.
    #[default]
    Automatic,
}

impl Animation {
    /// All animations in ordinal order.
    pub const ALL: [Animation; 7] = [
        Animation::Fade,
        Animation::SlideRight,
        Animation::SlideLeft,
        Animation::SlideBottom,
        Animation::None,
        Animation::Middle,
        Animation::Automatic,
    ];

    /// Returns the ordinal of this animation.
    ///
    /// `Automatic` sits apart from the others at 100.
    pub fn value(&self) -> u8 {
        match self {
            Animation::Fade => 0,
            Animation::SlideRight => 1,
            Animation::SlideLeft => 2,
            Animation::SlideBottom => 3,
            Animation::None => 4,
            Animation::Middle => 5,
            Animation::Automatic => 100,
        }
    }

    /// Creates an animation from its ordinal.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|animation| animation.value() == value)
    }

    /// Returns `true` if the view should skip animating.
    pub fn is_none(&self) -> bool {
        matches!(self, Animation::None)
    }
}

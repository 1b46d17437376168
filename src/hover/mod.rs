//! Hover interaction: state machine and tooltip.
//!
//! ```text
//!            pointer_over (match)
//!   Idle ─────────────────────────▶ Hovering(element)
//!    ▲                                   │   │
//!    │          pointer_out              │   │ pointer_over (other match)
//!    └───────────────────────────────────┘   └──▶ Hovering(other)
//! ```

mod controller;
mod tooltip;

pub use controller::{
    HoverCommand,
    HoverController,
    HoverOutcome,
    HoverState,
    IgnoreReason,
    KeyPress,
};
pub use tooltip::{
    CURSOR_OFFSET,
    DelayedTooltip,
    MIN_EDGE_DISTANCE,
    Point,
    Size,
    TooltipSurface,
    VIEWPORT_MARGIN,
    place_tooltip,
};

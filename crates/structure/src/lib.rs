mod bookmark;
mod boundary;
mod category;
mod config;
mod dom;
mod editor;
mod error;
mod fonts;
mod format;
mod hooks;
mod keyboard;
mod list;
mod navigate;
mod range;
mod split;
mod tokens;
mod value;
mod walker;

pub use crate::bookmark::*;
pub use crate::boundary::*;
pub use crate::category::*;
pub use crate::config::*;
pub use crate::dom::*;
pub use crate::editor::*;
pub use crate::error::*;
pub use crate::fonts::*;
pub use crate::format::*;
pub use crate::hooks::*;
pub use crate::keyboard::*;
pub use crate::list::*;
pub use crate::navigate::*;
pub use crate::range::*;
pub use crate::split::*;
pub use crate::tokens::*;
pub use crate::value::*;
pub use crate::walker::*;

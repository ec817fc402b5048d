//! FOSSology API model types.

mod common;
mod enums;
mod folder;
mod group;
mod info;
mod item;
mod job;
mod license;
mod report;
mod search;
mod upload;
mod user;

pub use common::*;
pub use enums::*;
pub use folder::*;
pub use group::*;
pub use info::*;
pub use item::*;
pub use job::*;
pub use license::*;
pub use report::*;
pub use search::*;
pub use upload::*;
pub use user::*;

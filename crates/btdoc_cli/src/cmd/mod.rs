/// `convert` command implementation.
pub mod convert;
/// `info` command implementation.
pub mod info;
/// `layout` command implementation.
pub mod layout;
/// `show` command implementation.
pub mod show;
/// `tree` command implementation.
pub mod tree;
/// Shared CLI helper functions.
pub mod util;
/// `vars` command implementation.
pub mod vars;

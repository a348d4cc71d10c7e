pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

// Factory helpers, one typed context per command
pub fn lookup() -> LogCtx<ops::lookup::Lookup> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn extract() -> LogCtx<ops::extract::Extract> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn menu() -> LogCtx<ops::menu::Menu> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }

pub(crate) mod color;
pub(crate) mod log;
pub(crate) mod page;

use self::page::DashboardFormatter;
use crate::options::OutputMode;
use supports_color::Stream;

/// Detects whether a terminal supports color, and gives details about that
/// support. It takes into account the `NO_COLOR` environment variable.
fn supports_color() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

/// Create a dashboard formatter based on the given output mode
pub(crate) fn get_formatter(mode: OutputMode) -> Box<dyn DashboardFormatter> {
    if mode.is_plain() || !supports_color() {
        return Box::new(page::PlainFormatter);
    }
    Box::new(page::ColorFormatter)
}

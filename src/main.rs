use gettextrs::{LocaleCategory, bindtextdomain, setlocale, textdomain};
use log::warn;

use concentration::{logging, ui};

const GETTEXT_PACKAGE: &str = "concentration";
const LOCALEDIR: &str = "/usr/share/locale";

fn main() -> glib::ExitCode {
    logging::init();

    setlocale(LocaleCategory::LcAll, "");
    if let Err(err) = bindtextdomain(GETTEXT_PACKAGE, LOCALEDIR) {
        warn!("translations unavailable: {err}");
    }
    if let Err(err) = textdomain(GETTEXT_PACKAGE) {
        warn!("translations unavailable: {err}");
    }

    ui::app::run()
}

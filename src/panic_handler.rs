use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use std::io::{self, Write};
use std::panic;

/// Install the panic hook.
///
/// Debug builds get `better-panic` backtraces, release builds write a
/// `human-panic` crash report. Either way the terminal is restored first so
/// the message is readable.
pub fn initialize_panic_handler() {
    #[cfg(debug_assertions)]
    {
        better_panic::install();
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            log::error!("{panic_info}");
            default_hook(panic_info);
            std::process::exit(1);
        }));
    }

    #[cfg(not(debug_assertions))]
    {
        let metadata = human_panic::metadata!();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            log::error!("{panic_info}");
            let report = human_panic::handle_dump(&metadata, panic_info);
            let _ = human_panic::print_msg(report, &metadata);
            std::process::exit(1);
        }));
    }
}

/// Restore terminal to a clean state
///
/// Leaves raw mode and the alternate screen, disables mouse capture and
/// shows the cursor again.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = execute!(io::stderr(), crossterm::cursor::Show);
    let _ = writeln!(io::stderr());
}

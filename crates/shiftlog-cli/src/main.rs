use clap::Parser;
use shiftlog_cli::{run, Cli};

fn main() {
    // Reset SIGPIPE to default behavior so piping `shiftlog list` into
    // `head`/`less` exits quietly instead of panicking.
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();
    shiftlog_cli::init_logging(cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

use socium_agent::run;

fn main() {
    if let Err(err) = run() {
        tracing::error!(error = ?err, "socium agent failed");
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

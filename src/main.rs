use growstage::cli::run;
use growstage::engine::EngineError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        // Engine state errors and failed writes are internal; everything else is a user error
        let is_internal = e.downcast_ref::<EngineError>().is_some()
            || e.to_string().starts_with("Failed to");
        if is_internal {
            eprintln!("Internal error: {}", e);
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
            std::process::exit(2);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

use anyhow::Error;
use ftmwatch_lib::config::Config;
use simplelog::CombinedLogger;
use simplelog::*;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::mpsc::Sender;
use std::sync::Arc;

mod alert;
mod ingester;
extern crate log;
extern crate simplelog;

enum ThreadStatus {
    Abort(String),
}

fn main() -> Result<(), Error> {
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::max(),
            ConfigBuilder::new()
                .add_filter_allow_str("ftmwatch")
                .set_time_format_str("[%d.%m.%Y; %T]")
                .build(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Debug,
            ConfigBuilder::new()
                .add_filter_allow_str("ftmwatch")
                .set_time_format_str("[%d.%m.%Y; %T]")
                .build(),
            std::fs::OpenOptions::new().create(true).append(true).open("ftmwatch.log")?,
        ),
    ])
    .unwrap();

    let config = Config::new()?;

    // Raised to stop the ingester between cycles / page iterations without cutting an
    // in-flight persist short
    let shutdown = Arc::new(AtomicBool::new(false));

    let (tx, rx) = mpsc::channel();
    start_ingester_thread(&tx, config, Arc::clone(&shutdown));

    // This blocks until we receive a message, which in turn we only receive if there was an error
    match rx.recv() {
        Ok(msg) => match msg {
            ThreadStatus::Abort(why) => anyhow::bail!("{why}"),
        },

        Err(why) => anyhow::bail!("{why}"),
    }
}

fn start_ingester_thread(tx: &Sender<ThreadStatus>, config: Config, shutdown: Arc<AtomicBool>) {
    let tx_abort_channel = tx.clone();

    std::thread::spawn(move || {
        let worker = ingester::Ingester::new(config, shutdown);
        println!("Starting ingester");

        if let Err(why) = worker.start() {
            tx_abort_channel.send(ThreadStatus::Abort(why.to_string())).unwrap();
        }
    });
}

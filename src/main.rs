use std::io;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::{sync::watch, task::LocalSet};

use elmloop::{
    app::{Counter, CounterApp, CounterMsg},
    infrastructure::{cli::Cli, config::Config},
    presentation::console::ConsoleRenderer,
    utils::{initialize_logging, initialize_panic_handler},
    Renderer, Runtime,
};

async fn run_counter(app: CounterApp) -> Result<()> {
    let (done_tx, mut done_rx) = watch::channel(false);
    let mut console = ConsoleRenderer::new(io::stdout(), app.config().max_ticks);
    let renderer = move |model: &Counter| -> Result<()> {
        console.render(model)?;
        if !model.running {
            let _ = done_tx.send(true);
        }
        Ok(())
    };

    let subscriptions = app.clone();
    let runtime = Runtime::with_subscription(
        || app.init(),
        app.clone(),
        renderer,
        move |model: &Counter| subscriptions.subscriptions(model),
    )?;

    tokio::select! {
        _ = done_rx.wait_for(|done| *done) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping counter");
            runtime.dispatch(CounterMsg::Stop)?;
        }
    }

    tracing::info!("Counter finished: {}", serde_json::to_string(&runtime.stats())?);
    Ok(())
}

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    let config = Config::new()?;
    let counter = args.apply(&config.counter);
    tracing::debug!(?counter, "Effective counter configuration");

    let local = LocalSet::new();
    local.run_until(run_counter(CounterApp::new(counter))).await
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}

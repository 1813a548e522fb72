// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process;
use the_spigot::channels::JsonLinesChannel;
use the_spigot::config::{load_and_validate_config, Application, WorkerConfig};
use the_spigot::errors::ValidationError;
use the_spigot::observability::init_tracing;
use the_spigot::proto::Tuple;
use the_spigot::tasks::Task;
use the_spigot::tuple;

/// Builds the demo application: a numeric filter, a text transform and a
/// component counting words from the transform's output.
fn build_application() -> Result<Application, ValidationError> {
    let mut app = Application::new("spigot-demo");
    app.declare_input("sentences")?;

    app.add(
        Task::filter(|t: &Tuple| t.get(0).and_then(|v| v.as_f64()).is_some_and(|n| n > 0.0))
            .name("positive")
            .emits("positives"),
    )?;

    app.add(
        Task::each(|ctx, t| {
            let text = t
                .get(0)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("expected a text value, got {:?}", t.get(0)))?;
            ctx.emit(tuple![text.to_uppercase()]);
            Ok(())
        })
        .name("shout")
        .emits("shouted"),
    )?;

    app.add(
        Task::component(["sentences", "shouted"], |ctx, t| {
            let text = t.get(0).and_then(|v| v.as_str()).unwrap_or_default();
            for word in text.split_whitespace() {
                ctx.emit(tuple![word.to_lowercase(), 1]);
            }
            Ok(())
        })
        .name("word_count")
        .emits("word_counts")
        .parallelism(4),
    )?;

    Ok(app)
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} --manifest", program);
    eprintln!("       {} [config.yaml] <task-name>", program);
    eprintln!("Example: {} configs/worker.yaml positive", program);
    process::exit(1);
}

// stdout carries the protocol; everything human-readable goes to stderr.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("the-spigot");

    let app = match build_application() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to assemble application: {}", e);
            process::exit(1);
        }
    };

    if args.len() == 2 && args[1] == "--manifest" {
        match app.manifest().to_yaml() {
            Ok(yaml) => print!("{}", yaml),
            Err(e) => {
                eprintln!("Failed to render manifest: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let (config, task_name) = match args.as_slice() {
        [_, task] => (WorkerConfig::default(), task.as_str()),
        [_, path, task] => match load_and_validate_config(path) {
            Ok(config) => (config, task.as_str()),
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                process::exit(1);
            }
        },
        _ => usage(program),
    };

    init_tracing(config.get_log_filter());

    let channel = JsonLinesChannel::stdio(&config);
    if let Err(e) = app.run_task(task_name, channel).await {
        eprintln!("Worker {} stopped: {}", task_name, e);
        process::exit(1);
    }
}

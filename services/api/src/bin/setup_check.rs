//! services/api/src/bin/setup_check.rs
//!
//! Verifies a development environment end to end: configuration, the
//! Postgres database, the face-api model files, and the Ollama backend
//! with its chat model. Prints a colored checklist and exits non-zero
//! when anything required is missing.

use api_lib::config::Config;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::time::Duration;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// The face-api model files the mood detector downloads at page load.
const MODEL_FILES: [&str; 6] = [
    "tiny_face_detector_model-weights_manifest.json",
    "tiny_face_detector_model-shard1",
    "face_landmark_68_model-weights_manifest.json",
    "face_landmark_68_model-shard1",
    "face_expression_model-weights_manifest.json",
    "face_expression_model-shard1",
];

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

fn pass(msg: &str) {
    println!("{}✓{} {}", GREEN, RESET, msg);
}

fn fail(msg: &str) {
    println!("{}✗{} {}", RED, RESET, msg);
}

fn hint(msg: &str) {
    println!("  {}→ {}{}", YELLOW, msg, RESET);
}

async fn check_database(config: &Config) -> bool {
    match PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            pool.close().await;
            pass("Database is reachable");
            true
        }
        Err(e) => {
            fail(&format!("Database connection failed: {}", e));
            hint("Check DATABASE_URL and that Postgres is running");
            false
        }
    }
}

fn check_model_files(config: &Config) -> bool {
    let dir = &config.models_dir;
    if !dir.is_dir() {
        fail(&format!("Model directory {} does not exist", dir.display()));
        hint("Download the face-api models into that directory");
        return false;
    }
    let mut ok = true;
    for file in MODEL_FILES {
        if Path::new(dir).join(file).is_file() {
            pass(&format!("Found {}", file));
        } else {
            fail(&format!("Missing {}", file));
            ok = false;
        }
    }
    if !ok {
        hint("Mood detection needs all six face-api model files");
    }
    ok
}

async fn check_ollama(config: &Config) -> bool {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build();
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            fail(&format!("Could not build HTTP client: {}", e));
            return false;
        }
    };

    let url = format!("{}/api/tags", config.ollama_base_url.trim_end_matches('/'));
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => {
            fail("Ollama is not reachable");
            hint("Start it with `ollama serve`");
            return false;
        }
    };
    if !response.status().is_success() {
        fail(&format!("Ollama returned HTTP {}", response.status()));
        return false;
    }
    pass("Ollama is running");

    let tags: TagsResponse = match response.json().await {
        Ok(tags) => tags,
        Err(e) => {
            fail(&format!("Could not parse the Ollama model list: {}", e));
            return false;
        }
    };
    if tags.models.iter().any(|m| m.name == config.chat_model) {
        pass(&format!("Chat model '{}' is pulled", config.chat_model));
        true
    } else {
        fail(&format!("Chat model '{}' is not pulled", config.chat_model));
        hint(&format!("Run `ollama pull {}`", config.chat_model));
        false
    }
}

#[tokio::main]
async fn main() {
    println!("Checking Serenica setup...\n");

    let config = match Config::from_env() {
        Ok(config) => {
            pass("Configuration loaded");
            config
        }
        Err(e) => {
            fail(&format!("Configuration error: {}", e));
            hint("Create a .env file with at least DATABASE_URL set");
            std::process::exit(1);
        }
    };

    let mut ok = true;
    ok &= check_database(&config).await;
    ok &= check_model_files(&config);
    ok &= check_ollama(&config).await;

    println!();
    if ok {
        println!("{}All checks passed.{}", GREEN, RESET);
    } else {
        println!("{}Some checks failed; see above.{}", RED, RESET);
        std::process::exit(1);
    }
}

use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::Path;

use glacier_care::{
    assembler,
    config::{Config, OcrSettings},
    extraction::DocumentExtractor,
    init_tracing,
    models::{ApiResponse, RawDocument},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let matches = Command::new("extract_report")
        .about("Extract the text of a medical document, optionally explaining it")
        .arg(
            Arg::new("file")
                .help("Document to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("content-type")
                .help("MIME type of the document; guessed from the extension when omitted")
                .long("content-type")
                .short('t')
                .value_name("MIME"),
        )
        .arg(
            Arg::new("analyze")
                .help("Send the extracted text to the language model and print the result")
                .long("analyze")
                .short('a')
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("file")
        .map(Path::new)
        .context("file argument is required")?;
    let content_type = match matches.get_one::<String>("content-type") {
        Some(content_type) => content_type.clone(),
        None => mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    };
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = RawDocument::new(bytes, filename.clone(), content_type);

    if !matches.get_flag("analyze") {
        dotenvy::dotenv().ok();
        let extractor = DocumentExtractor::from_settings(&OcrSettings::from_env());
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&document)).await?;
        println!("{}", extracted.text());
        return Ok(());
    }

    let state = AppState::from_config(Config::from_env()?)?;
    let extractor = state.extractor.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&document)).await?;

    let interpretation = state.interpreter.analyze(extracted.text(), Some(&filename)).await;
    let result = assembler::assemble(
        interpretation,
        Some(&filename),
        extracted.text(),
        state.interpreter.model_name(),
        Some(extracted.method()),
    );

    println!("{}", serde_json::to_string_pretty(&ApiResponse::success(result))?);
    Ok(())
}

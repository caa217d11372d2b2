use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use privscope::{Extraction, Extractor, ExtractorConfig, Fingerprint};
use serde::Serialize;

use crate::{
    app::{AcquireOptions, GlobalOptions},
    commands::common::{hex32, load_file, locate_target, Failure, FingerprintInfo},
    output::print_output,
};

#[derive(Debug, Serialize)]
pub struct ExtractionInfo {
    pub file: String,
    pub private_data: String,
    pub checksum: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub file_offset: String,
    pub rva: String,
    pub fingerprint: FingerprintInfo,
}

#[derive(Debug, Serialize)]
struct BatchExtractionInfo {
    results: Vec<ExtractionInfo>,
    failures: Vec<Failure>,
    total_files: usize,
    valid_count: usize,
}

pub fn run(
    paths: &[PathBuf],
    acquire: &AcquireOptions,
    checksums: &[u32],
    sequential: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let mut config = if sequential {
        ExtractorConfig::sequential()
    } else {
        ExtractorConfig::default()
    };
    for checksum in checksums {
        config = config.with_checksum(*checksum);
    }
    let extractor = Extractor::new(config);

    match paths {
        [] => {
            let path = locate_target(acquire)?;
            run_single(&extractor, &path, opts)
        }
        [path] => run_single(&extractor, path, opts),
        _ => run_batch(&extractor, paths, opts),
    }
}

fn run_single(extractor: &Extractor, path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let info = extract_file(extractor, path)?;

    print_output(&info, opts, display_extraction)
}

fn run_batch(extractor: &Extractor, paths: &[PathBuf], opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut results = Vec::new();
    let mut failures = Vec::new();
    for (path, outcome) in extractor.extract_many(paths) {
        let info = outcome
            .with_context(|| format!("failed to extract private data: {}", path.display()))
            .and_then(|extraction| {
                let file = load_file(&path)?;
                Ok(report(&path, &extraction, Fingerprint::of(file.data())))
            });

        match info {
            Ok(info) => results.push(info),
            Err(e) => {
                log::error!("{}: {e:#}", path.display());
                failures.push(Failure {
                    file: path.display().to_string(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    let batch = BatchExtractionInfo {
        total_files: paths.len(),
        valid_count: results.iter().filter(|info| info.valid).count(),
        results,
        failures,
    };

    print_output(&batch, opts, |batch| {
        for info in &batch.results {
            display_extraction(info);
            println!();
        }
        for failure in &batch.failures {
            println!("{}: {}", failure.file, failure.error);
        }
        if !batch.failures.is_empty() {
            println!();
        }
        println!(
            "Processed {} files, {} valid, {} failed",
            batch.total_files,
            batch.valid_count,
            batch.failures.len()
        );
    })?;

    if !batch.failures.is_empty() {
        bail!(
            "extraction failed for {} of {} files",
            batch.failures.len(),
            batch.total_files
        );
    }
    Ok(())
}

fn extract_file(extractor: &Extractor, path: &Path) -> anyhow::Result<ExtractionInfo> {
    let file = load_file(path)?;
    let fingerprint = Fingerprint::of(file.data());

    let extraction = extractor
        .extract_file(&file)
        .with_context(|| format!("failed to extract private data: {}", path.display()))?;

    Ok(report(path, &extraction, fingerprint))
}

fn report(path: &Path, extraction: &Extraction, fingerprint: Fingerprint) -> ExtractionInfo {
    let result = extraction.result;

    ExtractionInfo {
        file: path.display().to_string(),
        private_data: result.bytes.to_hex(),
        checksum: format!("0x{:08x}", result.checksum),
        valid: result.recognized,
        build: result.build.map(|build| build.to_string()),
        file_offset: hex32(extraction.file_offset as u64),
        rva: hex32(u64::from(extraction.rva)),
        fingerprint: fingerprint.into(),
    }
}

fn display_extraction(info: &ExtractionInfo) {
    let valid = if info.valid { "valid" } else { "not valid" };
    println!("privateData is: {} ({valid})", info.private_data);
    println!("  File:      {}", info.file);
    println!("  Checksum:  {}", info.checksum);
    if let Some(build) = &info.build {
        println!("  Build:     {build}");
    }
    println!("  Location:  file offset {}, RVA {}", info.file_offset, info.rva);
    println!("  Size:      {} bytes", info.fingerprint.size);
    println!("  MD5:       {}", info.fingerprint.md5);
    println!("  SHA-1:     {}", info.fingerprint.sha1);
}

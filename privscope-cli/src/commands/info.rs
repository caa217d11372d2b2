use std::path::Path;

use privscope::{file::CODE_SECTION_NAME, Fingerprint};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{hex32, load_file, FingerprintInfo},
    output::{print_output, render_table},
};

#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub file: String,
    pub machine: String,
    pub image_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeInfo>,
    pub sections: Vec<SectionInfo>,
    pub fingerprint: FingerprintInfo,
}

#[derive(Debug, Serialize)]
pub struct CodeInfo {
    pub file_offset: String,
    pub rva: String,
    pub raw_size: usize,
    pub virtual_size: usize,
    pub scanned: usize,
}

#[derive(Debug, Serialize)]
pub struct SectionInfo {
    pub name: String,
    pub rva: String,
    pub virtual_size: u32,
    pub file_offset: String,
    pub raw_size: u32,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = load_file(path)?;

    let code = match file.code_region() {
        Ok(region) => Some(CodeInfo {
            file_offset: hex32(region.file_offset() as u64),
            rva: hex32(u64::from(region.virtual_address())),
            raw_size: region.raw_size(),
            virtual_size: region.virtual_size(),
            scanned: region.len(),
        }),
        Err(e) => {
            log::warn!("{CODE_SECTION_NAME}: {e}");
            None
        }
    };

    let sections = file
        .sections()
        .map(|section| SectionInfo {
            name: String::from_utf8_lossy(&section.name)
                .trim_end_matches('\0')
                .to_string(),
            rva: hex32(u64::from(section.virtual_address)),
            virtual_size: section.virtual_size,
            file_offset: hex32(u64::from(section.pointer_to_raw_data)),
            raw_size: section.size_of_raw_data,
        })
        .collect();

    let info = FileInfo {
        file: path.display().to_string(),
        machine: format!("0x{:04x} (AMD64)", file.machine()),
        image_base: format!("0x{:x}", file.imagebase()),
        code,
        sections,
        fingerprint: Fingerprint::of(file.data()).into(),
    };

    print_output(&info, opts, |info| {
        println!("File:        {}", info.file);
        println!("Machine:     {}", info.machine);
        println!("Image base:  {}", info.image_base);
        println!("Size:        {} bytes", info.fingerprint.size);
        println!("MD5:         {}", info.fingerprint.md5);
        println!("SHA-1:       {}", info.fingerprint.sha1);

        if let Some(code) = &info.code {
            println!("\nCode ({CODE_SECTION_NAME}):");
            println!("  File offset:   {}", code.file_offset);
            println!("  RVA:           {}", code.rva);
            println!("  Raw size:      {}", code.raw_size);
            println!("  Virtual size:  {}", code.virtual_size);
            println!("  Scanned bytes: {}", code.scanned);
        }

        println!("\nSections:");
        let rows = info.sections.iter().map(|s| {
            vec![
                s.name.clone(),
                s.rva.clone(),
                s.virtual_size.to_string(),
                s.file_offset.clone(),
                s.raw_size.to_string(),
            ]
        });
        print!(
            "{}",
            render_table(
                &[
                    ("Name", false),
                    ("RVA", false),
                    ("VSize", true),
                    ("Offset", false),
                    ("RawSize", true),
                ],
                rows,
                "  ",
            )
        );
    })
}

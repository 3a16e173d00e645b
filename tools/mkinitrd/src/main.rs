//! Skull OS Initrd Packer
//!
//! Packs a list of files into the flat initrd image the kernel's
//! storage layer mounts at boot: magic-tagged header, packed record
//! table, then the raw file data. The layout constants are shared with
//! `skull-vfs` so the packer and the mount path cannot drift apart.

use skull_vfs::{INITRD_HEADER_LEN, INITRD_MAGIC, INITRD_NAME_LEN, INITRD_RECORD_LEN};
use std::path::{Path, PathBuf};
use std::{env, fs, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: mkinitrd <output-image> <file>...");
        eprintln!();
        eprintln!("Packs the given files into an initrd image for the kernel.");
        process::exit(1);
    }

    let output = PathBuf::from(&args[1]);
    let inputs: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();

    println!("Creating initrd with {} files...", inputs.len());

    let mut entries = Vec::with_capacity(inputs.len());
    for input in &inputs {
        println!("  Adding {}...", input.display());
        let contents = match fs::read(input) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Error reading {}: {}", input.display(), e);
                process::exit(1);
            }
        };
        entries.push((entry_name(input), contents));
    }

    let image = build_image(&entries);
    if let Err(e) = fs::write(&output, &image) {
        eprintln!("Error writing {}: {}", output.display(), e);
        process::exit(1);
    }

    println!("Wrote {} ({} bytes)", output.display(), image.len());
}

/// Record name for an input path: its final component, truncated to
/// fit the 64-byte name field with a terminating NUL. The cut backs up
/// to a character boundary so multibyte names stay valid UTF-8.
fn entry_name(path: &Path) -> String {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if name.len() >= INITRD_NAME_LEN {
        let mut cut = INITRD_NAME_LEN - 1;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
    }
    name
}

/// Assemble an image from (name, contents) pairs.
///
/// Record offsets are absolute from the start of the image; data
/// follows the record table in argument order.
fn build_image(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut image = Vec::new();
    image.extend_from_slice(&INITRD_MAGIC);
    image.extend_from_slice(&(entries.len() as u32).to_le_bytes());

    let mut offset = INITRD_HEADER_LEN + entries.len() * INITRD_RECORD_LEN;
    for (name, contents) in entries {
        let mut field = [0u8; INITRD_NAME_LEN];
        let bytes = name.as_bytes();
        field[..bytes.len()].copy_from_slice(bytes);
        image.extend_from_slice(&field);
        image.extend_from_slice(&(offset as u32).to_le_bytes());
        image.extend_from_slice(&(contents.len() as u32).to_le_bytes());
        offset += contents.len();
    }
    for (_, contents) in entries {
        image.extend_from_slice(contents);
    }
    image
}

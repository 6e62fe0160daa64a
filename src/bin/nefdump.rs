/*
 * nef-raw - bin/nefdump.rs
 *
 * Copyright (C) 2022 Hubert Figuière
 *
 * This library is free software: you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public License
 * as published by the Free Software Foundation, either version 3 of
 * the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library.  If not, see
 * <http://www.gnu.org/licenses/>.
 */

//! Command-line front end: dump a NEF's metadata tree and, optionally,
//! its decoded raw raster.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use getopts::Options;
use log::LevelFilter;

use nef_raw::metadata::MetadataIter;
use nef_raw::NefFile;

fn usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options] FILE", program);
    print!("{}", opts.usage(&brief));
}

/// `-v` (level 1) turns on per-tag diagnostics (`log::debug!` call sites);
/// a second `-v` (level 2) adds per-seek diagnostics (`log::trace!`).
fn verbosity_from_count(n: u32) -> LevelFilter {
    match n {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("o", "", "write output to FILE instead of stdout", "FILE");
    opts.optflagmulti("v", "verbose", "increase trace verbosity (repeatable)");
    opts.optflag("p", "profile", "print decode timing to stderr");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            usage(&program, &opts);
            return 2;
        }
    };

    if matches.opt_present("h") {
        usage(&program, &opts);
        return 0;
    }

    if matches.free.is_empty() {
        eprintln!("missing input file");
        usage(&program, &opts);
        return 2;
    }

    let level = verbosity_from_count(matches.opt_count("v") as u32);
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();

    let path = &matches.free[0];
    let profile = matches.opt_present("p");
    let out_path = matches.opt_str("o");

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("can't open {}: {}", path, e);
            return 1;
        }
    };

    let start = Instant::now();
    let nef = match NefFile::open(file) {
        Ok(nef) => nef,
        Err(e) => {
            eprintln!("failed to decode {}: {}", path, e);
            return 1;
        }
    };
    let decode_time = start.elapsed();

    if dump(&mut std::io::stdout(), &nef).is_err() {
        eprintln!("error writing output");
        return 1;
    }

    // No TIFF/JPEG encoder is carried by this crate (that's an external
    // collaborator's job): regardless of the requested extension, `-o`
    // writes the decoded raster as a plain 16-bit-per-sample PGM.
    if let Some(out_path) = out_path {
        match File::create(&out_path) {
            Ok(f) => {
                if write_pgm(&mut BufWriter::new(f), &nef).is_err() {
                    eprintln!("error writing {}", out_path);
                    return 1;
                }
            }
            Err(e) => {
                eprintln!("can't create {}: {}", out_path, e);
                return 1;
            }
        }
    }

    if profile {
        eprintln!("decode: {:?}", decode_time);
    }

    0
}

fn dump(out: &mut dyn Write, nef: &NefFile) -> std::io::Result<()> {
    writeln!(out, "IFDs: {}", nef.ifds.len())?;
    for (name, entry, ifd_index) in MetadataIter::new(&nef.ifds) {
        writeln!(out, "  [{}] {} = {:?}", ifd_index, name, entry.value)?;
    }

    if !nef.makernote_ifds.is_empty() {
        writeln!(out, "Makernote IFDs: {}", nef.makernote_ifds.len())?;
        for (name, entry, ifd_index) in MetadataIter::new(&nef.makernote_ifds) {
            writeln!(out, "  [{}] {} = {:?}", ifd_index, name, entry.value)?;
        }
    }

    match &nef.cfa {
        Some(cfa) => writeln!(out, "CFA: {} {:?}", cfa.pattern.to_string(), cfa.repeat)?,
        None => writeln!(out, "CFA: none")?,
    }

    writeln!(
        out,
        "Raster: {}x{} @ {} bpc ({} bytes)",
        nef.raster.width,
        nef.raster.height,
        nef.raster.bpc,
        nef.raster.data_size()
    )?;

    Ok(())
}

/// Write the decoded raster as a binary (P5-like) 16-bit-per-sample PGM:
/// a short ASCII header followed by big-endian `u16` samples, row-major.
/// The maxval in the header reflects the sensor's actual bit depth so a
/// PGM viewer that clips at 65535 still displays correctly.
fn write_pgm(out: &mut dyn Write, nef: &NefFile) -> std::io::Result<()> {
    let maxval = (1_u32 << nef.raster.bpc) - 1;
    writeln!(out, "P5")?;
    writeln!(out, "{} {}", nef.raster.width, nef.raster.height)?;
    writeln!(out, "{}", maxval)?;
    for &sample in nef.raster.data16() {
        out.write_all(&sample.to_be_bytes())?;
    }
    Ok(())
}

fn main() {
    std::process::exit(run());
}

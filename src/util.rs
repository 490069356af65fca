// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Utils: project paths, source-file loading
//! and a xoshiro RNG wrapper: rand.rs
//! textual PPM image I/O: ppm.rs

use std::{
    env,
    ffi::OsString,
    fs::{read_dir, File},
    io::{self, ErrorKind, Read},
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

mod rand;
pub use rand::*;
pub mod ppm;

/// get flag_file path...
pub fn get_project_root(flag_file: &str) -> io::Result<PathBuf> {
    let path = env::current_dir()?;
    let mut path_ancestors = path.as_path().ancestors();

    while let Some(p) = path_ancestors.next() {
        let has_flag = read_dir(p)?
            .into_iter()
            .any(|p| p.unwrap().file_name() == OsString::from(flag_file));
        if has_flag {
            return Ok(PathBuf::from(p));
        }
    }
    Err(io::Error::new(
        ErrorKind::NotFound,
        "Ran out of places to find flag_file",
    ))
}

/// Gets the absolute path of the crate root. It looks for where Cargo.lock locates,
/// so binary executables installed elsewhere can still locate resources next to
/// their Cargo.lock stub.
pub fn get_root_path() -> String {
    match get_project_root("Cargo.lock") {
        Ok(p) => {
            let s = format!("{:?}", p);
            s[1..s.len() - 1].to_string()
        }
        Err(_e) => ".".to_string(),
    }
}

pub fn get_abs_path(fpath: &str) -> String {
    if Path::new(fpath).is_relative() {
        format!("{}{}{}", get_root_path(), MAIN_SEPARATOR, fpath)
    } else {
        fpath.to_string()
    }
}

pub fn get_file_name(fpath: &str) -> String {
    Path::new(fpath)
        .file_name()
        .unwrap_or(&OsString::from(""))
        .to_str()
        .unwrap_or("")
        .to_string()
}

/// Read a whole text file, for shader and kernel sources.
/// A zero-length file counts as a short read and fails.
pub fn read_source(fpath: &str) -> io::Result<String> {
    let mut f = File::open(get_abs_path(fpath))?;
    let mut src = String::new();
    f.read_to_string(&mut src)?;
    if src.is_empty() {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("empty source file: {}", fpath),
        ));
    }
    Ok(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_of_path() {
        assert_eq!(get_file_name("a/b/c.vert"), "c.vert");
        assert_eq!(get_file_name("c.vert"), "c.vert");
        assert_eq!(get_file_name(""), "");
    }

    #[test]
    fn abs_path_passthrough() {
        // already-absolute paths come back untouched
        assert_eq!(get_abs_path("/tmp/k.cl"), "/tmp/k.cl");
    }

    #[test]
    fn read_source_missing_file() {
        assert!(read_source("/definitely/not/here.glsl").is_err());
    }
}

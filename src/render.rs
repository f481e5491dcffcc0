//! Printing of file listings.

use projsync_core::{FileListing, ResolvedFile};
use std::io::{self, Write};

pub const BUILD_BANNER: &str = "===== BUILD SOURCE FILES:";
pub const OTHER_BANNER: &str = "===== OTHER REFERENCED FILES:";

#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub breadcrumbs: bool,
    pub separator: &'a str,
}

/// One path per line under a banner per list.
pub fn write_text(
    out: &mut impl Write,
    listing: &FileListing,
    style: TextStyle<'_>,
) -> io::Result<()> {
    writeln!(out, "{BUILD_BANNER}")?;
    write_entries(out, &listing.build_files, style)?;
    writeln!(out, "{OTHER_BANNER}")?;
    write_entries(out, &listing.other_files, style)?;
    out.flush()
}

pub fn write_json(out: &mut impl Write, listing: &FileListing) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, listing)?;
    writeln!(out)?;
    out.flush()
}

fn write_entries(
    out: &mut impl Write,
    entries: &[ResolvedFile],
    style: TextStyle<'_>,
) -> io::Result<()> {
    for entry in entries {
        if style.breadcrumbs {
            writeln!(out, "{}\t{}", entry.path, entry.breadcrumb.join(style.separator))?;
        } else {
            writeln!(out, "{}", entry.path)?;
        }
    }
    Ok(())
}

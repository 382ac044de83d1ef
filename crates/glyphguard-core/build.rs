use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    // Data files live under the crate directory so they are included in the
    // crate tarball and `cargo publish` / `cargo install` work correctly.
    let data_dir = Path::new(&manifest_dir).join("assets").join("data");

    compile_confusables(&data_dir, &out_dir);

    println!("cargo:rerun-if-changed=assets/data/confusables.txt");
    println!("cargo:rerun-if-changed=build.rs");
}

/// One parsed `source ; target ; type` line.
struct Entry {
    line_no: usize,
    source: Vec<u32>,
    target: Vec<u32>,
}

fn compile_confusables(data_dir: &Path, out_dir: &str) {
    let confusables_path = data_dir.join("confusables.txt");
    let content = fs::read_to_string(&confusables_path)
        .unwrap_or_else(|e| panic!("Failed to read confusables.txt: {e}"));

    let mut entries = Vec::new();
    let mut skipped_ascii = 0usize;
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        // Upstream files start with a byte order mark.
        let line = raw.trim_start_matches('\u{FEFF}').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let data = line.split('#').next().unwrap_or("");
        let fields: Vec<&str> = data.split(';').map(str::trim).collect();
        if fields.len() < 2 {
            panic!("confusables.txt:{line_no}: expected `source ; target ; type`, got {line:?}");
        }
        let source = parse_sequence(fields[0], line_no);
        let target = parse_sequence(fields[1], line_no);
        // ASCII sources (0 -> O, l -> I) would rewrite plain ASCII text.
        if source.iter().all(|&cp| cp < 0x80) {
            skipped_ascii += 1;
            continue;
        }
        entries.push(Entry {
            line_no,
            source,
            target,
        });
    }

    if entries.is_empty() {
        panic!("confusables.txt contains no entries");
    }

    let mut code = String::new();
    code.push_str("/// Auto-generated confusable sequence table: (source, target).\n");
    code.push_str("pub const CONFUSABLE_TABLE: &[(&[char], &[char])] = &[\n");
    for entry in &entries {
        let src = char_slice_literal(&entry.source);
        let tgt = char_slice_literal(&entry.target);
        let line_no = entry.line_no;
        code.push_str(&format!("    ({src}, {tgt}), // line {line_no}\n"));
    }
    code.push_str("];\n");
    let count = entries.len();
    code.push_str(&format!("\npub const CONFUSABLE_COUNT: usize = {count};\n"));
    code.push_str(&format!(
        "\n/// Rows dropped because their source is ASCII.\npub const CONFUSABLE_ASCII_SKIPPED: usize = {skipped_ascii};\n"
    ));

    let out_path = Path::new(out_dir).join("confusables_gen.rs");
    fs::write(&out_path, code).unwrap();
}

/// Parse a space-separated list of hex code points.
fn parse_sequence(field: &str, line_no: usize) -> Vec<u32> {
    let mut seq = Vec::new();
    for part in field.split_whitespace() {
        let cp = u32::from_str_radix(part, 16)
            .unwrap_or_else(|e| panic!("confusables.txt:{line_no}: bad code point {part:?}: {e}"));
        if char::from_u32(cp).is_none() {
            panic!("confusables.txt:{line_no}: U+{cp:04X} is not a Unicode scalar value");
        }
        seq.push(cp);
    }
    if seq.is_empty() {
        panic!("confusables.txt:{line_no}: empty code point sequence");
    }
    seq
}

fn char_slice_literal(seq: &[u32]) -> String {
    let chars: Vec<String> = seq.iter().map(|cp| format!("'\\u{{{cp:04X}}}'")).collect();
    format!("&[{}]", chars.join(", "))
}

//! Go standard library import paths.

/// Top-level directories of the Go distribution's `src` tree.
const STD_ROOTS: &[&str] = &[
    "archive", "bufio", "builtin", "bytes", "cmd", "cmp", "compress", "container", "context",
    "crypto", "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go",
    "hash", "html", "image", "index", "io", "iter", "log", "maps", "math", "mime", "net", "os",
    "path", "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv", "strings",
    "structs", "sync", "syscall", "testing", "text", "time", "unicode", "unique", "unsafe",
    "weak",
];

/// Packages that live in the distribution but are not part of the
/// documented standard library.
const EXTRA_STD_PACKAGES: &[&str] = &["debug/goobj", "debug/plan9obj"];

/// Whether `import_path` names a package in the Go distribution.
pub fn is_standard_package(import_path: &str) -> bool {
    if EXTRA_STD_PACKAGES.contains(&import_path) {
        return true;
    }

    let root = import_path.split('/').next().unwrap_or_default();
    !root.contains('.') && STD_ROOTS.contains(&root)
}

/// Unit name of a standard package inside the distribution repository.
pub fn unit_path(import_path: &str) -> String {
    format!("src/{}", import_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_packages() {
        assert!(is_standard_package("fmt"));
        assert!(is_standard_package("net/http"));
        assert!(is_standard_package("debug/goobj"));
        assert!(is_standard_package("debug/plan9obj"));
        assert!(is_standard_package("encoding/json"));
    }

    #[test]
    fn test_non_standard_packages() {
        assert!(!is_standard_package("github.com/foo/bar"));
        assert!(!is_standard_package("fmtx"));
        assert!(!is_standard_package("example.com/fmt"));
        assert!(!is_standard_package("C"));
        assert!(!is_standard_package(""));
    }

    #[test]
    fn test_unit_path() {
        assert_eq!(unit_path("net/http"), "src/net/http");
    }
}

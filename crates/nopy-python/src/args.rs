//! Python command-line scanning
//!
//! Finds the script argument in a `python [options] [script] [args]` command
//! line, following the interpreter's own rules: options come first, a few of
//! them take a value, and `-c`, `-m` or `-` end option parsing without a
//! script path.

/// Options that consume the next argument as their value
const VALUE_OPTIONS: &[&str] = &["-Q", "-W", "-X"];

/// Options after which no script path can follow
const TERMINATING_OPTIONS: &[&str] = &["-", "-c", "-m"];

/// Index of the script path in `args`, if there is one.
pub fn find_source_arg<S: AsRef<str>>(args: &[S]) -> Option<usize> {
    let mut index = 0;
    while index < args.len() {
        let arg = args[index].as_ref();

        if TERMINATING_OPTIONS.contains(&arg) {
            return None;
        }

        if VALUE_OPTIONS.contains(&arg) {
            index += 2;
            continue;
        }

        if arg.starts_with('-') {
            index += 1;
            continue;
        }

        return Some(index);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lone_source_arg() {
        assert_eq!(find_source_arg(&["src/test/test.py"]), Some(0));
    }

    #[test]
    fn test_source_arg_followed_by_arguments() {
        assert_eq!(find_source_arg(&["a.py", "-x"]), Some(0));
        assert_eq!(find_source_arg(&["src/test/test.py", "-a", "file.xml"]), Some(0));
    }

    #[test]
    fn test_source_arg_after_options() {
        assert_eq!(find_source_arg(&["-O", "-d", "a.py"]), Some(2));
        assert_eq!(find_source_arg(&["-Od", "a.py"]), Some(1));
    }

    #[test]
    fn test_source_arg_after_option_with_value() {
        assert_eq!(find_source_arg(&["-X", "v", "a.py"]), Some(2));
        assert_eq!(find_source_arg(&["-W", "error", "-Q", "new", "a.py"]), Some(4));
    }

    #[test]
    fn test_value_option_at_end() {
        assert_eq!(find_source_arg(&["-X"]), None);
    }

    #[test]
    fn test_no_source_arg_for_module_command_or_stdin() {
        assert_eq!(find_source_arg(&["-m", "mod", "a.py"]), None);
        assert_eq!(find_source_arg(&["-c", "code", "a.py"]), None);
        assert_eq!(find_source_arg(&["-", "a.py"]), None);
        assert_eq!(find_source_arg(&["-O", "-m", "pip"]), None);
    }

    #[test]
    fn test_empty_args() {
        assert_eq!(find_source_arg::<&str>(&[]), None);
    }
}

/// Appends each pass-through argument to the base command line, wrapped in
/// double quotes and preceded by a single space.
///
/// Quotes inside an argument are not escaped, so an argument containing `"`
/// can end its quoting early and change how the child splits its command line.
pub fn build_command_line<S: AsRef<str>>(base: &str, args: &[S]) -> String {
    let mut command_line = String::from(base);

    for arg in args {
        command_line.push_str(" \"");
        command_line.push_str(arg.as_ref());
        command_line.push('"');
    }

    command_line
}

/// Arguments for which [`build_command_line`] cannot preserve the original
/// argument boundaries
pub fn has_embedded_quote(arg: &str) -> bool {
    arg.contains('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_leaves_the_base_unchanged() {
        let args: [&str; 0] = [];
        assert_eq!(build_command_line("myapp.exe --flag", &args), "myapp.exe --flag");
    }

    #[test]
    fn quotes_each_argument_in_order() {
        assert_eq!(
            build_command_line("myapp.exe --flag", &["hello world"]),
            r#"myapp.exe --flag "hello world""#
        );

        assert_eq!(
            build_command_line("java -jar relang.jar", &["a.rel", "", "-x"]),
            r#"java -jar relang.jar "a.rel" "" "-x""#
        );
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        let arg = r#"say "hi""#;
        assert!(has_embedded_quote(arg));
        assert!(!has_embedded_quote("plain"));

        // The first embedded quote closes the wrapping quote early
        assert_eq!(
            build_command_line("app.exe", &[arg]),
            r#"app.exe "say "hi"""#
        );
    }
}

/// Shell function printed by `envm init`.
///
/// `envm use` only prints `export` lines; a child process cannot change its
/// parent's environment. The function wraps the binary and `eval`s that
/// output so the variables land in the calling shell. Every other subcommand
/// passes straight through.
pub const INIT_SCRIPT: &str = r#"envm () {
    local command
    command="$1"
    if [ "$#" -gt 0 ]
    then
        shift
    fi
    case "$command" in
        (use) eval "$(command envm "$command" "$@")" ;;
        (*) command envm "$command" "$@" ;;
    esac
}
"#;

//! Bash completion script printed by `mmake completion`

/// Completes subcommands, then labels and targets via `mmake compgen`.
///
/// Bash splits words on `:` by default, so completions for `//pkg:ta` are
/// trimmed back to the part after the last `:` before being offered.
const BASH_COMPLETION: &str = r#"# bash completion for mmake
# Install with: source <(mmake completion)

_mmake() {
    local line="${COMP_LINE:0:COMP_POINT}"
    local word="${line##*[[:space:]]}"
    local IFS=$'\n'
    local candidates

    if [[ "$word" != //* ]]; then
        if [[ "$COMP_CWORD" -le 1 ]]; then
            COMPREPLY=( $(compgen -W "init clean info completion compgen query" -- "$word") )
        fi
        return 0
    fi

    candidates=( $(mmake compgen "$word" 2>/dev/null) )
    if [[ "$word" == *:* && "$COMP_WORDBREAKS" == *:* ]]; then
        local colon_prefix="${word%:*}:"
        candidates=( "${candidates[@]#"$colon_prefix"}" )
    fi
    COMPREPLY=( "${candidates[@]}" )

    # Directories end in '/': keep the cursor on the word
    if [[ ${#COMPREPLY[@]} -eq 1 && "${COMPREPLY[0]}" == */ ]]; then
        compopt -o nospace 2>/dev/null
    fi
    return 0
}

complete -F _mmake mmake
"#;

pub fn script() -> &'static str {
    BASH_COMPLETION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_registers_completion() {
        let script = script();
        assert!(script.contains("complete -F _mmake mmake"));
        assert!(script.contains("mmake compgen \"$word\""));
    }
}

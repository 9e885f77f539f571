use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/angelscript.pest"]
pub struct AngelScriptParser;

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn test_parser_accepts_empty_input() {
        let result = AngelScriptParser::parse(Rule::script, "");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parser_accepts_function() {
        let result = AngelScriptParser::parse(Rule::script, "void main() { int x = 1; }");
        assert!(result.is_ok());
    }
}

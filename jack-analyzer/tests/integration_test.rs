use std::fs;
use std::io::Write;

fn write_jack(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
    path
}

const SQUARE_GAME: &str = "\
class SquareGame {
   field Square square;
   field int direction;

   constructor SquareGame new() {
      let square = square;
      let direction = 0;
      return this;
   }

   method void dispose() {
      do square.dispose();
      do Memory.deAlloc(this);
      return;
   }

   method void moveSquare() {
      if (direction = 1) { do square.moveUp(); }
      if (direction = 2) { do square.moveDown(); }
      while (direction = 3) {
         do square.moveLeft();
      }
      return;
   }

   method void run() {
      var char key;
      var boolean exit;
      let exit = false;

      while (~exit) {
         let key = Keyboard.keyPressed();
         if (key = 81)  { let exit = true; }
         if (key = 131) { let direction = 1; }
         do moveSquare();
      }
      return;
   }
}
";

#[test]
fn square_game_class_parses_to_a_well_formed_tree() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_jack(dir.path(), "SquareGame.jack", SQUARE_GAME);

    let written = jack_analyzer::analyze_path(input.to_str().unwrap()).unwrap();
    let parse_xml = fs::read_to_string(&written[1]).unwrap();

    assert!(parse_xml.starts_with("<class>\n"));
    assert!(parse_xml.trim_end().ends_with("</class>"));
    assert!(parse_xml.contains("<subroutineDec>"));
    assert!(parse_xml.contains("<ifStatement>"));
    assert!(parse_xml.contains("<whileStatement>"));
    assert!(parse_xml.contains("<letStatement>"));
    assert!(parse_xml.contains("<doStatement>"));

    // balanced tags: every opening tag has a matching closer
    for tag in ["class", "subroutineDec", "statements", "expression", "term"] {
        let opens = parse_xml.matches(&format!("<{tag}>")).count();
        let closes = parse_xml.matches(&format!("</{tag}>")).count();
        assert_eq!(opens, closes, "unbalanced <{tag}>");
    }
}

#[test]
fn token_stream_escapes_symbols_used_as_xml_metacharacters() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_jack(
        dir.path(),
        "Cmp.jack",
        "class Cmp {\n  function void f() {\n    if (1 < 2) { return; }\n    return;\n  }\n}\n",
    );

    let written = jack_analyzer::analyze_path(input.to_str().unwrap()).unwrap();
    let token_xml = fs::read_to_string(&written[0]).unwrap();
    assert!(token_xml.contains("<symbol> &lt; </symbol>"));
}

#[test]
fn string_constants_with_embedded_keywords_are_not_misclassified() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_jack(
        dir.path(),
        "Str.jack",
        "class Str {\n  function void f() {\n    do Output.printString(\"return this\");\n    return;\n  }\n}\n",
    );

    let written = jack_analyzer::analyze_path(input.to_str().unwrap()).unwrap();
    let token_xml = fs::read_to_string(&written[0]).unwrap();
    assert!(token_xml.contains("<stringConstant> return this </stringConstant>"));
}

#[test]
fn nested_expressions_and_array_indexing_parse_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_jack(
        dir.path(),
        "Arr.jack",
        "class Arr {\n  function void f() {\n    var Array a;\n    let a[(1 + 2) * 3] = a[0];\n    return;\n  }\n}\n",
    );

    let written = jack_analyzer::analyze_path(input.to_str().unwrap()).unwrap();
    let parse_xml = fs::read_to_string(&written[1]).unwrap();
    assert!(parse_xml.contains("<letStatement>"));
}

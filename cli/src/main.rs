use clap::Parser;
use corral::{Module, Namespace, Value, Variables, render_error, stdlib};
use miette::{IntoDiagnostic, Result, miette};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::io::BufRead;
use std::io::BufReader;
use tracing::debug;

/// Corral - evaluate restricted Python expressions against the math module
#[derive(Parser, Debug)]
#[command(name = "corral")]
#[command(about = "Evaluate restricted Python expressions", long_about = None)]
struct Args {
    /// Bind a variable, as name=EXPR (EXPR is evaluated with no variables)
    #[arg(short = 'v', long = "var", value_name = "NAME=EXPR")]
    vars: Vec<String>,

    /// Bind variables from a JSON object
    #[arg(long, value_name = "JSON")]
    vars_json: Option<String>,

    /// Only expose the math module, without Python builtins
    #[arg(long)]
    no_builtins: bool,

    /// Print the parsed expression tree (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Expression to evaluate (if not provided, reads from stdin)
    expression: Option<String>,
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline(names: Vec<String>) -> (Reedline, DefaultPrompt) {
    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(names);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let line_editor = Reedline::create()
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = DefaultPrompt::new(DefaultPromptSegment::Empty, DefaultPromptSegment::Empty);

    (line_editor, prompt)
}

fn build_namespace(no_builtins: bool) -> Result<Namespace> {
    let module: Module = stdlib::math_module();
    Namespace::builder(&module)
        .with_builtins(!no_builtins)
        .build()
        .into_diagnostic()
}

/// Variables from `--vars-json` first, then each `-v name=EXPR` in order.
fn build_variables(args: &Args, namespace: &Namespace) -> Result<Variables> {
    let mut variables = Variables::new();

    if let Some(json) = &args.vars_json {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).into_diagnostic()?;
        for (name, value) in object {
            let value: Value = serde_json::from_value(value).into_diagnostic()?;
            variables.insert(name, value);
        }
    }

    for binding in &args.vars {
        let (name, source) = binding
            .split_once('=')
            .ok_or_else(|| miette!("expected NAME=EXPR, got '{}'", binding))?;
        let name = name.trim();
        let value = match namespace
            .compile(source)
            .and_then(|expr| expr.evaluate(&Variables::new()))
        {
            Ok(value) => value,
            Err(e) => {
                render_error(source, &e);
                return Err(miette!("could not evaluate variable '{}'", name));
            }
        };
        debug!(name, value = %value, "Bound variable");
        variables.insert(name, value);
    }

    Ok(variables)
}

/// Compiles and evaluates one expression, printing the result or the error.
/// Returns whether evaluation succeeded.
fn interpret_input(
    namespace: &Namespace,
    variables: &Variables,
    input: &str,
    debug_parse: bool,
) -> bool {
    let expr = match namespace.compile(input) {
        Ok(expr) => expr,
        Err(e) => {
            render_error(input, &e);
            return false;
        }
    };

    if debug_parse {
        println!("=== Parsed Expression ===");
        println!("{:#?}", expr.expr());
        println!();
    }

    match expr.evaluate(variables) {
        Ok(value) => {
            println!("{}", value);
            true
        }
        Err(e) => {
            render_error(input, &e);
            false
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; default to WARN if not set.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let namespace = build_namespace(args.no_builtins)?;
    let variables = build_variables(&args, &namespace)?;

    if let Some(expr) = &args.expression {
        if !interpret_input(&namespace, &variables, expr, args.debug_parse) {
            std::process::exit(1);
        }
        return Ok(());
    }

    if atty::is(atty::Stream::Stdin) {
        let mut names: Vec<String> = namespace.names().into_iter().map(str::to_string).collect();
        names.extend(variables.iter().map(|(name, _)| name.to_string()));
        let (mut line_editor, prompt) = setup_reedline(names);

        println!("Corral - type expressions to evaluate (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => {
                    if !buffer.trim().is_empty() {
                        interpret_input(&namespace, &variables, &buffer, args.debug_parse);
                    }
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = line.into_diagnostic()?;
            if line.trim().is_empty() {
                continue;
            }
            interpret_input(&namespace, &variables, &line, args.debug_parse);
        }
    }

    Ok(())
}

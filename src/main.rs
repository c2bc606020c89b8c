use cmethod::method::*;

use clap::{value_parser, Arg, ArgAction, Command};

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = Command::new("Compiled method disassembler")
        .version(clap::crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Decode bytecode against a literal pool and print a listing")
        .arg(
            Arg::new("literal")
                .long("literal")
                .short('l')
                .value_name("VALUE")
                .action(ArgAction::Append)
                .value_parser(parse_literal)
                .help("Append to the literal pool (`nil`, `true`, `false`, `42`, `1.5`, `:sym`, or a string)"),
        )
        .arg(
            Arg::new("line")
                .long("line")
                .value_name("START:END:LINE")
                .action(ArgAction::Append)
                .value_parser(parse_line_entry)
                .help("Append to the line table (offsets are inclusive)"),
        )
        .arg(
            Arg::new("handler")
                .long("handler")
                .value_name("START:END:TARGET[:ensure]")
                .action(ArgAction::Append)
                .value_parser(parse_handler)
                .help("Append to the exception table (protected range is end-exclusive)"),
        )
        .arg(
            Arg::new("required")
                .long("required-args")
                .value_name("N")
                .value_parser(value_parser!(u16))
                .default_value("0"),
        )
        .arg(
            Arg::new("total")
                .long("total-args")
                .value_name("N")
                .value_parser(value_parser!(u16))
                .default_value("0"),
        )
        .arg(
            Arg::new("locals")
                .long("locals")
                .value_name("N")
                .value_parser(value_parser!(u16))
                .default_value("0"),
        )
        .arg(Arg::new("name").long("name").value_name("NAME"))
        .arg(Arg::new("file").long("file").value_name("FILE"))
        .arg(
            Arg::new("no offsets")
                .long("no-offsets")
                .action(ArgAction::SetTrue)
                .help("Don't prefix instructions with their offset"),
        )
        .arg(
            Arg::new("no lines")
                .long("no-lines")
                .action(ArgAction::SetTrue)
                .help("Don't print source line headers"),
        )
        .arg(
            Arg::new("validate")
                .long("validate")
                .action(ArgAction::SetTrue)
                .help("Check argument counts and line table ordering before printing"),
        )
        .arg(
            Arg::new("BYTECODE")
                .help("Bytecode as hex digits (whitespace is ignored)")
                .required(true)
                .value_parser(parse_bytecode)
                .index(1),
        )
        .get_matches();

    let literals: LiteralPool = matches
        .get_many::<Literal>("literal")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    let lines: Option<LineTable> = matches
        .get_many::<LineEntry>("line")
        .map(|entries| entries.copied().collect());
    let exceptions: Option<ExceptionTable> = matches
        .get_many::<ExceptionHandler>("handler")
        .map(|handlers| ExceptionTable::from(handlers.copied().collect::<Vec<_>>()));

    let method = CompiledMethod::new(MethodParts {
        bytecode: matches
            .get_one::<Bytecode>("BYTECODE")
            .cloned()
            .unwrap_or_default(),
        required_args: matches.get_one::<u16>("required").copied().unwrap_or(0),
        total_args: matches.get_one::<u16>("total").copied().unwrap_or(0),
        locals_count: matches.get_one::<u16>("locals").copied().unwrap_or(0),
        literals,
        exceptions,
        lines,
        name: matches.get_one::<String>("name").cloned(),
        defining_file: matches.get_one::<String>("file").cloned(),
        ..MethodParts::default()
    });

    let isa = StandardInstructionSet::new();
    if matches.get_flag("validate") {
        method.validate(&isa)?;
        log::info!("Method is well formed");
    }

    let settings = Settings {
        show_offsets: !matches.get_flag("no offsets"),
        show_lines: !matches.get_flag("no lines"),
        ..Settings::new()
    };
    let listing = Disassembly::of(&method, &isa, &settings)?;
    print!("{}", listing);

    Ok(())
}

fn parse_bytecode(hex: &str) -> Result<Bytecode, String> {
    let digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(String::from("odd number of hex digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16).map_err(|_| format!("`{}` is not a hex byte", byte))
        })
        .collect::<Result<Vec<u8>, String>>()
        .map(Bytecode::from)
}

fn parse_literal(value: &str) -> Result<Literal, String> {
    Ok(match value {
        "nil" => Literal::Nil,
        "true" => Literal::True,
        "false" => Literal::False,
        _ => {
            if let Some(symbol) = value.strip_prefix(':') {
                Literal::Symbol(symbol.to_owned())
            } else if let Ok(int) = value.parse::<i64>() {
                Literal::Integer(int)
            } else if let Ok(float) = value.parse::<f64>() {
                Literal::Float(float)
            } else {
                Literal::String(value.to_owned())
            }
        }
    })
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[i64; N], String> {
    let mut numbers = [0; N];
    let mut parts = value.split(':');
    for number in numbers.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| format!("expected {} `:`-separated numbers", N))?;
        *number = part
            .parse()
            .map_err(|_| format!("`{}` is not a number", part))?;
    }
    if let Some(extra) = parts.next() {
        return Err(format!(
            "unexpected `{}` after {} `:`-separated numbers",
            extra, N
        ));
    }
    Ok(numbers)
}

fn parse_line_entry(value: &str) -> Result<LineEntry, String> {
    let [start, end, line] = parse_numbers::<3>(value)?;
    Ok(LineEntry::new(start, end, line))
}

fn parse_handler(value: &str) -> Result<ExceptionHandler, String> {
    let (numbers, kind) = match value.strip_suffix(":ensure") {
        Some(numbers) => (numbers, HandlerKind::Ensure),
        None => (value.strip_suffix(":rescue").unwrap_or(value), HandlerKind::Rescue),
    };
    let [start, end, target] = parse_numbers::<3>(numbers)?;
    let to_offset = |n: i64| usize::try_from(n).map_err(|_| format!("`{}` is not an offset", n));
    Ok(ExceptionHandler::new(
        to_offset(start)?,
        to_offset(end)?,
        to_offset(target)?,
        kind,
    ))
}

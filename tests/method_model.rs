use cmethod::method::*;
use std::sync::Arc;
use std::thread;

fn assemble(isa: &StandardInstructionSet, program: &[(&str, &[u16])]) -> Bytecode {
    let mut code = Bytecode::new();
    for (name, operands) in program {
        code.push_instruction(isa, name, operands).unwrap();
    }
    code
}

#[test]
fn raw_parts_then_literals() {
    let isa = StandardInstructionSet::new();
    let code = assemble(&isa, &[("push_literal", &[2]), ("ret", &[])]);

    let mut method = CompiledMethod::from_raw_parts(code, 2, 1);
    assert_eq!(method.total_args(), 0);
    assert!(method.literals().is_empty());
    assert!(method.exceptions().is_none());
    assert!(method.lines().is_none());
    assert!(method.name().is_none());

    // Decoding before the literals are in place fails outright
    assert!(matches!(
        method.decode(&isa),
        Err(Error::OutOfRangeLiteral {
            index: 2,
            pool_len: 0,
            ..
        })
    ));

    method.set_literals(LiteralPool::from(vec![
        Literal::Symbol(String::from("a")),
        Literal::Symbol(String::from("b")),
        Literal::String(String::from("third")),
    ]));
    let decoded = method.decode(&isa).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(
        decoded[0].operands(),
        &[Operand::Literal(Literal::String(String::from("third")))]
    );
    assert_eq!(decoded[1].opcode().name, "ret");
}

#[test]
fn line_queries_on_method() {
    let mut method = CompiledMethod::from_raw_parts(Bytecode::new(), 0, 0);
    method.set_lines(Some(LineTable::from(vec![
        LineEntry::new(0, 4, 10),
        LineEntry::new(5, 9, 11),
        LineEntry::new(10, 14, 11),
    ])));

    assert_eq!(method.line_for_offset(4), 10);
    assert_eq!(method.line_for_offset(5), 11);
    assert_eq!(method.line_for_offset(20), UNKNOWN_LINE);
    assert_eq!(method.line_for_offset(-1), UNKNOWN_LINE);
    assert_eq!(method.first_offset_on_or_after_line(11), 5);
    assert_eq!(method.first_defined_line(), 10);

    // Queries don't change anything
    assert_eq!(method.line_for_offset(4), 10);

    method.set_lines(Some(LineTable::new()));
    assert_eq!(method.line_for_offset(0), UNKNOWN_LINE);
    assert_eq!(method.first_offset_on_or_after_line(0), NOT_FOUND);
    assert_eq!(method.first_defined_line(), NOT_FOUND);
}

#[test]
fn decode_matches_token_count() {
    let isa = StandardInstructionSet::new();
    let program: &[(&str, &[u16])] = &[
        ("push_self", &[]),
        ("push_literal", &[0]),
        ("push_int", &[2]),
        ("send_stack", &[1, 2]),
        ("set_local", &[0]),
        ("pop", &[]),
        ("push_local", &[0]),
        ("ret", &[]),
    ];
    let method = CompiledMethod::new(MethodParts {
        bytecode: assemble(&isa, program),
        locals_count: 1,
        literals: LiteralPool::from(vec![Literal::Float(0.5), Literal::Symbol(String::from("min"))]),
        ..MethodParts::default()
    });

    let tokens = method.bytecode().tokenize(&isa).unwrap();
    let decoded = method.decode(&isa).unwrap();
    assert_eq!(decoded.len(), tokens.len());
    for ((offset, _, raw), insn) in tokens.iter().zip(&decoded) {
        assert_eq!(offset.0, insn.offset());
        assert_eq!(raw.opcode, insn.opcode().code);
    }
    let names: Vec<&str> = decoded.iter().map(|insn| insn.opcode().name).collect();
    let expected: Vec<&str> = program.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, expected);
    assert_eq!(decoded[3].to_string(), "send_stack :min 2");
}

#[test]
fn concurrent_readers() {
    let isa = StandardInstructionSet::new();
    let mut method = CompiledMethod::from_raw_parts(
        assemble(&isa, &[("push_literal", &[0]), ("ret", &[])]),
        0,
        0,
    );
    method.set_literals(LiteralPool::from(vec![Literal::Integer(9)]));
    method.set_lines(Some(LineTable::from(vec![LineEntry::new(0, 3, 1)])));
    let method = Arc::new(method);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let method = method.clone();
            thread::spawn(move || {
                let isa = StandardInstructionSet::new();
                let decoded = method.decode(&isa).unwrap();
                (decoded[0].to_string(), method.line_for_offset(3))
            })
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap(), (String::from("push_literal 9"), 1));
    }
}

#[test]
fn nested_block_listing() {
    let isa = StandardInstructionSet::new();
    let scope = LexicalScope::top_level("Object");

    let mut block = CompiledMethod::new(MethodParts {
        bytecode: assemble(&isa, &[("push_local", &[0]), ("ret", &[])]),
        required_args: 1,
        total_args: 1,
        locals_count: 1,
        name: Some(String::from("__block__")),
        ..MethodParts::default()
    });
    block.set_scope(&scope);
    let block = Arc::new(block);

    let method = CompiledMethod::new(MethodParts {
        bytecode: assemble(
            &isa,
            &[
                ("push_self", &[]),
                ("create_block", &[1]),
                ("send_stack_with_block", &[0, 0]),
                ("ret", &[]),
            ],
        ),
        literals: LiteralPool::from(vec![
            Literal::Symbol(String::from("each")),
            Literal::Method(block.clone()),
        ]),
        name: Some(String::from("walk")),
        scope: Some(scope.clone()),
        ..MethodParts::default()
    });
    assert!(method.validate(&isa).is_ok());
    assert_eq!(method.scope().map(|s| s.module().to_owned()), Some(String::from("Object")));

    let settings = Settings {
        recursive: true,
        ..Settings::new()
    };
    let listing = Disassembly::of(&method, &isa, &settings).unwrap().to_string();
    assert!(listing.contains("0001: create_block #<CompiledMethod __block__>"));
    assert!(listing.contains("0004: send_stack_with_block :each 0"));
    assert!(listing.contains("== __block__ == arity 1, locals 1, literals 0"));
}

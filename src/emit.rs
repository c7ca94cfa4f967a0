//! The code-emitter façade: the parser's only way of producing output.
//!
//! The parser never writes Jasmin text directly. It calls `gen_*` methods in
//! the order its grammar actions fire; this module accumulates them per
//! subroutine, allocates labels for `if`/`while` branching, and assembles
//! the finished class with a fixed runtime preamble (`print*`/`read*`
//! helpers) that every emitted class carries so I/O does not need a
//! separate support library.

use crate::error::DriverError;
use crate::valtype::ValType;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Stack depth is not tracked precisely; every method gets this generous
/// fixed bound rather than a computed one.
const STACK_LIMIT: u32 = 64;

fn jasmin_type(ty: ValType) -> &'static str {
    match (ty.is_array(), ty.is_boolean()) {
        (true, true) => "[Z",
        (true, false) => "[I",
        (false, true) => "Z",
        (false, false) => "I",
    }
}

fn jasmin_return_type(ty: ValType) -> &'static str {
    if ty.is_boolean() || ty.is_integer() {
        jasmin_type(ty)
    } else {
        "V"
    }
}

struct Method {
    name: String,
    param_types: Vec<ValType>,
    return_type: ValType,
    lines: Vec<String>,
}

impl Method {
    fn descriptor(&self) -> String {
        let params: String = self.param_types.iter().map(|t| jasmin_type(*t)).collect();
        format!("({params}){}", jasmin_return_type(self.return_type))
    }
}

pub struct Emitter {
    class_name: String,
    methods: Vec<Method>,
    current: Option<Method>,
    label_counter: u32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            class_name: String::new(),
            methods: Vec::new(),
            current: None,
            label_counter: 0,
        }
    }

    pub fn set_class_name(&mut self, name: &str) {
        self.class_name = name.to_string();
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Opens a new subroutine's instruction buffer. `None` denotes the
    /// synthetic `main`, whose descriptor is fixed rather than derived from
    /// a callable's parameter list.
    pub fn init_subroutine_codegen(&mut self, name: &str, param_types: Vec<ValType>, return_type: ValType) {
        self.current = Some(Method {
            name: name.to_string(),
            param_types,
            return_type,
            lines: Vec::new(),
        });
    }

    fn current_mut(&mut self) -> &mut Method {
        self.current.as_mut().expect("no subroutine is currently open")
    }

    pub fn close_subroutine_codegen(&mut self, locals_width: u32) {
        let mut m = self.current.take().expect("no subroutine is currently open");
        m.lines.push(format!(".limit locals {locals_width}"));
        m.lines.push(format!(".limit stack {STACK_LIMIT}"));
        self.methods.push(m);
    }

    pub fn gen_1(&mut self, op: &str) {
        self.current_mut().lines.push(format!("    {op}"));
    }

    pub fn gen_2(&mut self, op: &str, arg: impl std::fmt::Display) {
        self.current_mut().lines.push(format!("    {op} {arg}"));
    }

    pub fn gen_newarray(&mut self, ty: ValType) {
        let t = if ty.is_boolean() { "boolean" } else { "int" };
        self.gen_2("newarray", t);
    }

    /// A fresh label id; the caller decides where to place it and which
    /// branch instructions reference it.
    pub fn new_label(&mut self) -> u32 {
        self.label_counter += 1;
        self.label_counter
    }

    pub fn label_name(id: u32) -> String {
        format!("L{id}")
    }

    pub fn emit_label(&mut self, id: u32) {
        self.current_mut().lines.push(format!("{}:", Self::label_name(id)));
    }

    pub fn emit_jump(&mut self, op: &str, id: u32) {
        self.gen_2(op, Self::label_name(id));
    }

    pub fn gen_call(&mut self, name: &str, param_types: &[ValType], return_type: ValType) {
        let params: String = param_types.iter().map(|t| jasmin_type(*t)).collect();
        let descriptor = format!("({params}){}", jasmin_return_type(return_type));
        self.gen_2(
            "invokestatic",
            format!("{}/{name}{descriptor}", self.class_name),
        );
    }

    pub fn gen_read(&mut self, ty: ValType) {
        let (helper, descriptor) = if ty.is_boolean() {
            ("readBoolean", "()Z")
        } else {
            ("readInt", "()I")
        };
        self.gen_2("invokestatic", format!("{}/{helper}{descriptor}", self.class_name));
    }

    pub fn gen_print(&mut self, ty: ValType) {
        let (helper, descriptor) = if ty.is_boolean() {
            ("printBool", "(Z)V")
        } else {
            ("printInt", "(I)V")
        };
        self.gen_2("invokestatic", format!("{}/{helper}{descriptor}", self.class_name));
    }

    pub fn gen_print_string(&mut self, literal: &str) {
        self.gen_2("ldc", format!("\"{literal}\""));
        self.gen_2(
            "invokestatic",
            format!("{}/printString(Ljava/lang/String;)V", self.class_name),
        );
    }

    /// Renders the finished class, including the fixed I/O runtime preamble,
    /// as Jasmin assembly text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, ".class public {}", self.class_name);
        let _ = writeln!(out, ".super java/lang/Object");
        out.push('\n');
        out.push_str(&RUNTIME_PREAMBLE.replace("SIMPL_CLASS_PLACEHOLDER", &self.class_name));
        out.push('\n');

        for m in &self.methods {
            let descriptor = m.descriptor();
            let header = if m.name == "main" {
                ".method public static main([Ljava/lang/String;)V".to_string()
            } else {
                format!(".method public static {}{descriptor}", m.name)
            };
            let _ = writeln!(out, "{header}");
            for line in &m.lines {
                let _ = writeln!(out, "{line}");
            }
            out.push_str(".end method\n\n");
        }
        out
    }

    pub fn write_class_file(&self, output_dir: &Path) -> Result<std::path::PathBuf, DriverError> {
        fs::create_dir_all(output_dir).map_err(|source| DriverError::CannotWrite {
            path: output_dir.display().to_string(),
            source,
        })?;
        let path = output_dir.join(format!("{}.j", self.class_name));
        fs::write(&path, self.render()).map_err(|source| DriverError::CannotWrite {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }

    /// Shells out to the Jasmin assembler; the assembler's own stderr and
    /// exit code are passed through untouched, since interpreting them is
    /// outside this compiler's business.
    pub fn assemble(jasmin_jar: &Path, source_file: &Path, output_dir: &Path) -> Result<(), DriverError> {
        let status = Command::new("java")
            .arg("-jar")
            .arg(jasmin_jar)
            .arg("-d")
            .arg(output_dir)
            .arg(source_file)
            .status()
            .map_err(DriverError::AssemblerSpawn)?;

        if !status.success() {
            return Err(DriverError::AssemblerSpawn(std::io::Error::other(format!(
                "assembler exited with {status}"
            ))));
        }
        Ok(())
    }
}

/// Static helpers every emitted class carries for `read`/`write`, since
/// Jasmin gives no built-in console I/O and the expression-emission order
/// (operand pushed, then the operation consuming it) rules out inlining
/// `getstatic java/lang/System/out` ahead of an already-emitted value.
const RUNTIME_PREAMBLE: &str = r#".field private static in Ljava/io/BufferedReader;

.method static <clinit>()V
    .limit stack 3
    .limit locals 0
    new java/io/BufferedReader
    dup
    new java/io/InputStreamReader
    dup
    getstatic java/lang/System/in Ljava/io/InputStream;
    invokespecial java/io/InputStreamReader/<init>(Ljava/io/InputStream;)V
    invokespecial java/io/BufferedReader/<init>(Ljava/io/Reader;)V
    putstatic SIMPL_CLASS_PLACEHOLDER/in Ljava/io/BufferedReader;
    return
.end method

.method public static readInt()I
    .limit stack 2
    .limit locals 0
    getstatic SIMPL_CLASS_PLACEHOLDER/in Ljava/io/BufferedReader;
    invokevirtual java/io/BufferedReader/readLine()Ljava/lang/String;
    invokestatic java/lang/Integer/parseInt(Ljava/lang/String;)I
    ireturn
.end method

.method public static readBoolean()Z
    .limit stack 2
    .limit locals 0
    getstatic SIMPL_CLASS_PLACEHOLDER/in Ljava/io/BufferedReader;
    invokevirtual java/io/BufferedReader/readLine()Ljava/lang/String;
    invokestatic java/lang/Boolean/parseBoolean(Ljava/lang/String;)Z
    ireturn
.end method

.method public static printInt(I)V
    .limit stack 2
    .limit locals 1
    getstatic java/lang/System/out Ljava/io/PrintStream;
    iload_0
    invokevirtual java/io/PrintStream/print(I)V
    return
.end method

.method public static printBool(Z)V
    .limit stack 2
    .limit locals 1
    getstatic java/lang/System/out Ljava/io/PrintStream;
    iload_0
    invokevirtual java/io/PrintStream/print(Z)V
    return
.end method

.method public static printString(Ljava/lang/String;)V
    .limit stack 2
    .limit locals 1
    getstatic java/lang/System/out Ljava/io/PrintStream;
    aload_0
    invokevirtual java/io/PrintStream/print(Ljava/lang/String;)V
    return
.end method
"#;

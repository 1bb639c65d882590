//! # stubgen - Type Stubs for Dynamically Declared Accessors
//!
//! Generator classes declare positional arguments and named options, and the
//! framework turns each declaration into a reader method at runtime. Static
//! type checkers never see those readers. stubgen inspects a snapshot of the
//! program's class graph and emits RBI stubs that declare them, with return
//! types inferred from each declaration's type tag.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stubgen::{GeneratorCompiler, GeneratorConfig, Pipeline, StubTree};
//!
//! let graph = stubgen::load_snapshot("classes.json".as_ref())?;
//! let compiler = GeneratorCompiler::new(&graph, &GeneratorConfig::default())?;
//!
//! let mut tree = StubTree::new();
//! let report = Pipeline::new().with(compiler).run(&mut tree);
//!
//! for class in tree.classes() {
//!     let path = stubgen::stub_path(class.name());
//!     std::fs::write(path, stubgen::render::render_class(class))?;
//! }
//! assert!(report.is_success());
//! ```
//!
//! ## Building a Class Graph by Hand
//!
//! ```ignore
//! use stubgen::{ArgumentSpec, ClassGraph};
//!
//! let graph = ClassGraph::builder()
//!     .class("Rails::Generators::Base", None)
//!     .class("Rails::Generators::NamedBase", Some("Rails::Generators::Base"))
//!     .class("ServiceGenerator", Some("Rails::Generators::NamedBase"))
//!     .argument(ArgumentSpec::new("result_type", "string").required(true))
//!     .option(ArgumentSpec::new("skip_comments", "boolean").with_default(true))
//!     .build()?;
//! ```
//!
//! ## Architecture
//!
//! - **[`stubgen_types`]**: declared members, type tags, inferred descriptors, snapshots
//! - **[`stubgen_reflect`]**: the class registry abstraction and the in-memory class graph
//! - **[`stubgen_compiler`]**: candidate selection, member diffing, type inference,
//!   stub emission and rendering
//! - **`stubgen-cli`**: the `stubgen` binary
//!
//! ## How a Stub Is Computed
//!
//! 1. Candidates are named subclasses of the root generator type that do not
//!    live in a built-in framework namespace.
//! 2. Each candidate is compared with its nearest built-in ancestor. Members
//!    declared identically by that ancestor are dropped.
//! 3. Every remaining member becomes a zero-argument accessor. Its type comes
//!    from the declared tag and is nilable unless the member is required or
//!    has a default.

pub use stubgen_compiler::{
    BuiltinMatcher, ClassNode, CompileError, Compiler, Contribution, Failure, GeneratorCompiler,
    GeneratorConfig, Method, Outcome, Pipeline, Report, StubTree, infer, render,
};

pub use stubgen_reflect::{Class, ClassGraph, ClassId, ClassRegistry, GraphBuilder, load_snapshot};

pub use stubgen_types::{
    ArgumentSpec, BaseType, ClassRecord, MemberRecord, ProgramSnapshot, TypeDescriptor, TypeTag,
    stub_path, underscore,
};

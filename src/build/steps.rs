//! Tool-call construction for build steps.
//!
//! These builders are thin data-to-argument-list translators: they turn
//! module descriptors and directory layout into [`ToolCall`] values for the
//! `compiler`, `archiver`, and `tester` tools. The execution engine treats
//! the produced calls as opaque.

use std::path::Path;

use crate::module::ModuleDescriptor;
use crate::tool::ToolCall;

/// Build the compiler call for one module.
pub fn compile_call(module: &ModuleDescriptor, modules_dir: &Path, classes_dir: &Path) -> ToolCall {
    let source = modules_dir.join(&module.name).display().to_string();
    let classes = classes_dir.join(&module.name).display().to_string();
    let mut call = ToolCall::of("compiler")
        .with_args(["--module", module.name.as_str()])
        .with_args(["--source", source.as_str()])
        .with_args(["--classes", classes.as_str()]);
    if let Some(version) = &module.version {
        call = call.with_args(["--module-version", version.as_str()]);
    }
    call
}

/// Build the archiver call packaging one module's classes.
pub fn archive_call(
    module: &ModuleDescriptor,
    classes_dir: &Path,
    dist_dir: &Path,
    extension: &str,
) -> ToolCall {
    let classes = classes_dir.join(&module.name).display().to_string();
    let file = dist_dir
        .join(format!("{}.{}", module.name, extension))
        .display()
        .to_string();
    ToolCall::of("archiver")
        .with_args(["--module", module.name.as_str()])
        .with_args(["--classes", classes.as_str()])
        .with_args(["--file", file.as_str()])
}

/// Build the test-runner call for one module.
pub fn test_call(module: &ModuleDescriptor) -> ToolCall {
    ToolCall::of("tester").with_args(["--module", module.name.as_str()])
}

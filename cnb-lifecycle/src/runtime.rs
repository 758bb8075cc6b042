use crate::build::{BuildContext, BuildResult};
use crate::buildpack::Buildpack;
use crate::data::buildpack::BuildpackDescriptor;
use crate::data::launch::Launch;
use crate::detect::{DetectContext, DetectResult};
use crate::error::Error;
use crate::layer::Layers;
use crate::toml_file::{read_toml_file, write_toml_file};
use crate::{Result, SUPPORTED_BUILDPACK_API};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::exit;

/// Main entry point for this framework.
///
/// The Buildpack API requires separate entry points for each of `bin/{detect,build}`. A single
/// binary is built instead and the filename by which it is invoked determines the phase. The
/// desired filenames are then created as symlinks to this single binary.
pub fn cnb_runtime<B: Buildpack>(buildpack: &B) {
    match read_buildpack_dir().and_then(|dir| read_buildpack_descriptor(&dir)) {
        Ok(descriptor) => {
            if descriptor.api != SUPPORTED_BUILDPACK_API {
                eprintln!("Error: Cloud Native Buildpack API mismatch");
                eprintln!(
                    "This buildpack ({}) uses Cloud Native Buildpacks API version {}.",
                    &descriptor.buildpack.name, &descriptor.api,
                );
                eprintln!("But the underlying cnb-lifecycle library requires CNB API {SUPPORTED_BUILDPACK_API}.");

                exit(254)
            }
        }
        Err(error) => {
            buildpack.on_error(error);
            exit(1)
        }
    }

    // Using `std::env::args()` instead of `std::env::current_exe()` since the latter resolves
    // symlinks to their target on some platforms, whereas we need the original filename.
    let current_exe = env::args().next();
    let current_exe_file_name = current_exe
        .as_ref()
        .map(Path::new)
        .and_then(Path::file_name)
        .and_then(OsStr::to_str);

    let result = match current_exe_file_name {
        Some("detect") => cnb_runtime_detect(buildpack, parse_detect_args_or_exit()),
        Some("build") => cnb_runtime_build(buildpack, parse_build_args_or_exit()),
        other => {
            eprintln!(
                "Error: Expected the name of this executable to be 'detect' or 'build', but it was '{}'",
                other.unwrap_or("<unknown>")
            );
            eprintln!("The executable name is used to determine the current buildpack phase.");
            eprintln!("You might want to create 'detect' and 'build' links to this executable and run those instead.");
            exit(255)
        }
    };

    match result {
        Ok(exit_code) => exit(exit_code),
        Err(error) => {
            buildpack.on_error(error);
            exit(1)
        }
    }
}

/// Runs the detect phase and returns the exit code the process should terminate with.
pub fn cnb_runtime_detect<B: Buildpack>(buildpack: &B, args: DetectArgs) -> Result<i32, B::Error> {
    let app_dir = env::current_dir().map_err(Error::CannotDetermineAppDirectory)?;
    let stack_id = env::var("CNB_STACK_ID").map_err(Error::CannotDetermineStackId)?;
    let buildpack_dir = read_buildpack_dir()?;

    let detect_context = DetectContext {
        app_dir,
        stack_id,
        buildpack_descriptor: read_buildpack_descriptor(&buildpack_dir)?,
        buildpack_dir,
    };

    write_detect_result(&buildpack.detect(detect_context)?, &args.build_plan_path)
}

/// Runs the build phase and returns the exit code the process should terminate with.
pub fn cnb_runtime_build<B: Buildpack>(buildpack: &B, args: BuildArgs) -> Result<i32, B::Error> {
    let app_dir = env::current_dir().map_err(Error::CannotDetermineAppDirectory)?;
    let stack_id = env::var("CNB_STACK_ID").map_err(Error::CannotDetermineStackId)?;
    let buildpack_dir = read_buildpack_dir()?;

    let buildpack_plan =
        read_toml_file(&args.buildpack_plan_path).map_err(Error::CannotReadBuildpackPlan)?;

    let build_result = buildpack.build(BuildContext {
        app_dir,
        stack_id,
        layers: Layers::new(&args.layers_dir_path),
        buildpack_plan,
        buildpack_descriptor: read_buildpack_descriptor(&buildpack_dir)?,
        buildpack_dir,
    })?;

    write_build_result(
        &build_result,
        &args.layers_dir_path,
        &args.buildpack_plan_path,
    )
}

fn write_detect_result<E>(detect_result: &DetectResult, build_plan_path: &Path) -> Result<i32, E> {
    match detect_result {
        DetectResult::Fail => Ok(100),
        DetectResult::Pass { build_plan } => {
            if let Some(build_plan) = build_plan {
                write_toml_file(build_plan, build_plan_path).map_err(Error::CannotWriteBuildPlan)?;
            }

            Ok(0)
        }
    }
}

fn write_build_result<E>(
    build_result: &BuildResult,
    layers_dir: &Path,
    buildpack_plan_path: &Path,
) -> Result<i32, E> {
    for layer in &build_result.layers {
        layer.write(layers_dir)?;
    }

    if !build_result.processes.is_empty() {
        let launch = Launch {
            processes: build_result.processes.clone(),
        };

        write_toml_file(&launch, layers_dir.join("launch.toml"))
            .map_err(Error::CannotWriteLaunch)?;
    }

    write_toml_file(&build_result.plan, buildpack_plan_path)
        .map_err(Error::CannotWriteBuildpackPlan)?;

    Ok(0)
}

pub struct DetectArgs {
    pub platform_dir_path: PathBuf,
    pub build_plan_path: PathBuf,
}

pub struct BuildArgs {
    pub layers_dir_path: PathBuf,
    pub platform_dir_path: PathBuf,
    pub buildpack_plan_path: PathBuf,
}

fn parse_detect_args_or_exit() -> DetectArgs {
    let args: Vec<String> = env::args().collect();
    if let [_, platform_dir_path, build_plan_path] = args.as_slice() {
        DetectArgs {
            platform_dir_path: PathBuf::from(platform_dir_path),
            build_plan_path: PathBuf::from(build_plan_path),
        }
    } else {
        eprintln!("Usage: detect <platform_dir> <buildplan>");
        eprintln!("https://github.com/buildpacks/spec/blob/buildpack/v0.4/buildpack.md#detection");
        exit(1);
    }
}

fn parse_build_args_or_exit() -> BuildArgs {
    let args: Vec<String> = env::args().collect();
    if let [_, layers_dir_path, platform_dir_path, buildpack_plan_path] = args.as_slice() {
        BuildArgs {
            layers_dir_path: PathBuf::from(layers_dir_path),
            platform_dir_path: PathBuf::from(platform_dir_path),
            buildpack_plan_path: PathBuf::from(buildpack_plan_path),
        }
    } else {
        eprintln!("Usage: build <layers> <platform> <plan>");
        eprintln!("https://github.com/buildpacks/spec/blob/buildpack/v0.4/buildpack.md#build");
        exit(1);
    }
}

/// `CNB_BUILDPACK_DIR` when set, otherwise the directory above the `bin` directory of this
/// executable.
fn read_buildpack_dir<E>() -> Result<PathBuf, E> {
    if let Some(buildpack_dir) = env::var_os("CNB_BUILDPACK_DIR") {
        return Ok(PathBuf::from(buildpack_dir));
    }

    env::current_exe()
        .and_then(|exe| {
            exe.parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} has no parent directory", exe.display()),
                    )
                })
        })
        .map_err(Error::CannotDetermineBuildpackDirectory)
}

fn read_buildpack_descriptor<E>(buildpack_dir: &Path) -> Result<BuildpackDescriptor, E> {
    read_toml_file(buildpack_dir.join("buildpack.toml"))
        .map_err(Error::CannotReadBuildpackDescriptor)
}

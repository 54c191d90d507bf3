use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use indicatif::ProgressBar;
use tracing::{debug, info};
use zip::{ZipArchive, ZipWriter};

use super::arg_template::ArgTemplate;
use super::library_index::LibraryIndex;
use super::profile::Processor;
use crate::core::config::Side;
use crate::core::error::{LauncherError, LauncherResult};

const MODULE_DESCRIPTOR: &str = "module-info.class";

/// What happened to one processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOutcome {
    Skipped,
    Ran,
}

/// Runs install-profile processors in declared order.
///
/// Each processor's jar is copied into the scratch directory, the class files
/// of its classpath are merged into that copy and the result is started with
/// `java -jar`. A processor that fails stops the pipeline; effects of the ones
/// before it stay on disk.
pub struct ProcessorPipeline<'a> {
    side: Side,
    java: &'a Path,
    libraries: &'a LibraryIndex,
    launcher_dir: &'a Path,
    scratch_dir: &'a Path,
}

impl<'a> ProcessorPipeline<'a> {
    pub fn new(
        side: Side,
        java: &'a Path,
        libraries: &'a LibraryIndex,
        launcher_dir: &'a Path,
        scratch_dir: &'a Path,
    ) -> Self {
        Self {
            side,
            java,
            libraries,
            launcher_dir,
            scratch_dir,
        }
    }

    pub async fn run<R: Read + Seek>(
        &self,
        processors: &[Processor],
        args: &mut ArgTemplate<'_, R>,
        progress: &ProgressBar,
    ) -> LauncherResult<()> {
        let mut ran = 0_usize;
        for processor in processors {
            if self.run_one(processor, args).await? == ProcessorOutcome::Ran {
                ran += 1;
            }
            progress.inc(1);
        }
        info!("Ran {} of {} processors", ran, processors.len());
        Ok(())
    }

    pub async fn run_one<R: Read + Seek>(
        &self,
        processor: &Processor,
        args: &mut ArgTemplate<'_, R>,
    ) -> LauncherResult<ProcessorOutcome> {
        if !processor.runs_on(self.side) {
            debug!("Skipping {} processor {}", self.side, processor.jar);
            return Ok(ProcessorOutcome::Skipped);
        }

        let jar = self.prepare(processor)?;
        let merged = self.merge_classpath(processor, &jar)?;
        debug!("Merged {} classes into {:?}", merged, jar);

        let resolved = processor
            .args
            .iter()
            .map(|arg| args.resolve(arg))
            .collect::<LauncherResult<Vec<_>>>()?;

        info!("Running processor {}", processor.jar);
        invoke(self.java, &processor.jar, &jar, &resolved).await?;
        Ok(ProcessorOutcome::Ran)
    }

    /// Copy the processor's jar into the scratch directory.
    pub fn prepare(&self, processor: &Processor) -> LauncherResult<PathBuf> {
        let source = self.libraries.file_for(&processor.jar, self.launcher_dir)?;
        let file_name = source.file_name().ok_or_else(|| {
            LauncherError::Loader(format!("Processor jar {} has no file name", processor.jar))
        })?;
        let target = self.scratch_dir.join(file_name);
        std::fs::copy(&source, &target).map_err(|e| LauncherError::io(&source, e))?;
        Ok(target)
    }

    pub fn merge_classpath(&self, processor: &Processor, jar: &Path) -> LauncherResult<usize> {
        let sources = processor
            .classpath
            .iter()
            .map(|name| self.libraries.file_for(name, self.launcher_dir))
            .collect::<LauncherResult<Vec<_>>>()?;
        merge_class_files(jar, &sources)
    }
}

/// Append the class files of `sources` to the jar at `target`.
///
/// An entry already in `target`, or taken from an earlier source, is never
/// copied again. `module-info.class` is left out. Returns the number of
/// entries added.
pub fn merge_class_files(target: &Path, sources: &[PathBuf]) -> LauncherResult<usize> {
    let mut present: HashSet<String> = {
        let file = File::open(target).map_err(|e| LauncherError::io(target, e))?;
        ZipArchive::new(file)?.file_names().map(str::to_owned).collect()
    };

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(target)
        .map_err(|e| LauncherError::io(target, e))?;
    let mut writer = ZipWriter::new_append(file)?;
    let mut added = 0;

    for source in sources {
        let file = File::open(source).map_err(|e| LauncherError::io(source, e))?;
        let mut archive = ZipArchive::new(file)?;
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name().to_string();
            if !name.ends_with(".class") || name == MODULE_DESCRIPTOR || present.contains(&name) {
                continue;
            }
            writer.raw_copy_file(entry)?;
            present.insert(name);
            added += 1;
        }
    }

    writer.finish()?;
    Ok(added)
}

/// `java -jar <jar> <args>`, failing on a non-zero exit.
async fn invoke(java: &Path, name: &str, jar: &Path, args: &[String]) -> LauncherResult<()> {
    let output = tokio::process::Command::new(java)
        .arg("-jar")
        .arg(jar)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| LauncherError::JavaExecution(format!("{}: {}", java.display(), e)))?;

    if !output.status.success() {
        return Err(LauncherError::ProcessorFailed {
            jar: name.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

use crate::{io::open_las, opts::Info, types::FileFormat, utils::guess_file_format};
use anyhow::{ensure, Result};
use log::warn;

pub fn info(args: Info) -> Result<()> {
    let Info { file, compact } = args;

    ensure!(
        guess_file_format(&file) == Some(FileFormat::Las),
        "file name must end with '.las', but got '{}'",
        file.display()
    );

    let decoder = open_las(&file)?;
    let header = decoder.header();

    if header.point_format().is_none() {
        warn!(
            "'{}' uses point format {}, its points cannot be decoded",
            file.display(),
            header.point_data_record_format
        );
    }

    let json = if compact {
        serde_json::to_string(header)?
    } else {
        serde_json::to_string_pretty(header)?
    };
    println!("{json}");

    Ok(())
}

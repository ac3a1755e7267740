use clap::{App, Arg, SubCommand};
use std::fs;
use std::path::PathBuf;
use std::process;

//===========================================================================//

fn main() {
    env_logger::init();
    let matches = App::new("icotool")
        .version("0.1")
        .about("Inspects and extracts images from ICO files")
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extracts one image from an ICO file as a PNG")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(Arg::with_name("ico").required(true))
                .arg(Arg::with_name("index").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists images in an ICO file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("extract") {
        let path = submatches.value_of("ico").unwrap();
        let index = submatches.value_of("index").unwrap();
        let index = index.parse::<usize>().unwrap_or_else(|error| {
            fail(format!("Invalid index {:?}: {}", index, error))
        });
        let icons = icoread::decode_file(path)
            .unwrap_or_else(|error| fail(format!("{}: {}", path, error)));
        let icon = icons.into_iter().nth(index).unwrap_or_else(|| {
            fail(format!("{} has no image #{}", path, index))
        });
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            PathBuf::from(format!("{}.{}.png", path, index))
        };
        let out_file = fs::File::create(&out_path).unwrap();
        icon.into_image().write_png(out_file).unwrap();
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap();
        let icondir = icoread::read_directory(fs::File::open(path).unwrap())
            .unwrap_or_else(|error| fail(format!("{}: {}", path, error)));
        println!("Resource type: {:?}", icondir.resource_type());
        let icons = icoread::decode_file(path)
            .unwrap_or_else(|error| fail(format!("{}: {}", path, error)));
        for icon in icons.iter() {
            let kind = if icon.is_png() { "PNG" } else { "BMP" };
            println!(
                "{:5}: {}x{} {}, {} bpp, decoded as {}x{}",
                icon.icon_index(),
                icon.width(),
                icon.height(),
                kind,
                icon.colour_depth(),
                icon.image().width(),
                icon.image().height()
            );
        }
    }
}

fn fail(message: String) -> ! {
    eprintln!("icotool: {}", message);
    process::exit(1);
}

//===========================================================================//

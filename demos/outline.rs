use std::fs::File;
use std::io::BufReader;

use bpel2bpmn::{activity, parse_bpel, Error, NodeRef};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    // Read the input file from the command line arguments
    let input_file = std::env::args().nth(1).ok_or(Error::NoInputFile)?;
    if !input_file.ends_with(".bpel") && !input_file.ends_with(".xml") {
        return Err(Error::UnsupportedFileExt);
    }

    // Open and parse the process document
    let file = File::open(&input_file).map(BufReader::new)?;
    let document = parse_bpel(file)?;

    // Print the activity tree of the process
    println!("{}", document.root().real_name());
    print_activities(document.root(), 1);

    Ok(())
}

/// Print the activities below a node, one level of indent per nesting level
fn print_activities(node: NodeRef<'_>, depth: usize) {
    for child in activity::all_activity_children(node) {
        let marker = if activity::is_create_instance_set(child) {
            " (creates instance)"
        } else {
            ""
        };
        println!("{:indent$}{}{}", "", child.real_name(), marker, indent = depth * 2);
        print_activities(child, depth + 1);
    }
}

use std::fs::File;
use std::io::BufReader;

use bpel2bpmn::{activity, links, parse_bpel, Error};

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

    // Report the control link facts for every linked activity in the process
    for node in activity::all_activity_descendants(document.root()) {
        if !links::has_incoming_links(node) && !links::has_outgoing_links(node) {
            continue;
        }
        println!("{}", node.real_name());
        println!("  incoming: {}", links::incoming_link_names(node)?.join(", "));
        println!("  outgoing: {}", links::outgoing_link_names(node)?.join(", "));
        println!("  join condition: {}", links::join_condition(node)?);
        println!(
            "  join failure suppressed: {}",
            links::is_join_failure_suppressed(node)
        );
    }

    Ok(())
}

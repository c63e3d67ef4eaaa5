use nexum_apdu_transport_pcsc::{PcscDeviceManager, PcscReader};

/// Find a reader with a specific name
pub fn find_reader_by_name(
    manager: &PcscDeviceManager,
    reader_name: &str,
) -> Result<PcscReader, Box<dyn std::error::Error>> {
    manager
        .list_readers()?
        .into_iter()
        .find(|r| r.name() == reader_name)
        .ok_or_else(|| format!("Reader '{reader_name}' not found").into())
}

/// Find the first reader holding a card
pub fn find_reader_with_card(
    manager: &PcscDeviceManager,
) -> Result<PcscReader, Box<dyn std::error::Error>> {
    manager
        .list_readers()?
        .into_iter()
        .find(PcscReader::has_card)
        .ok_or_else(|| "No authenticator found on any reader".into())
}

/// List all available readers
pub fn list_readers(manager: &PcscDeviceManager) -> Result<(), Box<dyn std::error::Error>> {
    let readers = manager.list_readers()?;

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = if reader.has_card() {
            "card present"
        } else {
            "no card"
        };
        println!("{}. {} ({})", i + 1, reader.name(), status);
    }

    Ok(())
}

use crate::types::TrelloBoard;
use std::error::Error;
use std::path::Path;

/// Reads a Trello board export file, dropping archived cards and lists.
pub fn load_board(path: &Path) -> Result<TrelloBoard, Box<dyn Error>> {
    let payload = std::fs::read_to_string(path)?;
    parse_board(&payload)
}

pub fn parse_board(payload: &str) -> Result<TrelloBoard, Box<dyn Error>> {
    let mut board: TrelloBoard = serde_json::from_str(payload)?;
    board.cards.retain(|card| !card.closed);
    board.lists.retain(|list| !list.closed);
    Ok(board)
}

use sudokuscan::synthetic::{SheetLayout, render_reference_sheet, render_sheet};

fn main() {
    let layout = SheetLayout::default();

    let puzzle = render_sheet(
        &layout,
        &[
            (0, 0, 5),
            (0, 1, 3),
            (1, 0, 6),
            (2, 2, 8),
            (4, 4, 7),
            (6, 7, 2),
            (8, 8, 9),
        ],
    );
    puzzle.save("test_puzzle.png").unwrap();

    let sheet = render_reference_sheet(&layout);
    sheet.save("test_references.png").unwrap();

    let size = layout.canvas_size();
    println!("Created test_puzzle.png and test_references.png ({size}x{size})");
    println!("Run: sudokuscan references test_references.png --out numbers");
    println!("     sudokuscan extract test_puzzle.png");
}

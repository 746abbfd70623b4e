//! Basic example of using the generation engine

use sudogen_core::{Board, GenerateOptions, Generator, SimpleRng, SolutionsFlag, Solver};

fn main() {
    // Generate a full configuration
    println!("Generating a configuration...\n");
    let mut generator = Generator::new();
    let options = GenerateOptions {
        normalize: true,
        ..GenerateOptions::default()
    };
    if let Ok(reports) = generator.generate(&options) {
        if let Some(config) = reports[0].puzzle.clone() {
            println!("Configuration: {config}");

            // Subtract down to a 32-clue puzzle
            println!("\nGenerating a 32-clue puzzle from it...\n");
            let options = GenerateOptions {
                num_clues: 32,
                config: Some(config),
                ..GenerateOptions::default()
            };
            if let Ok(reports) = generator.generate(&options) {
                let report = &reports[0];
                match &report.puzzle {
                    Some(puzzle) => {
                        println!("Puzzle:        {puzzle}");
                        println!(
                            "Clues: {}, pops: {}, resets: {}, {} ms",
                            puzzle.mask().count(),
                            report.pops,
                            report.resets,
                            report.time_ms
                        );
                    }
                    None => println!("Generation was infeasible within its budget"),
                }
            }
        }
    }

    // Parse a board from a string and check its solution count
    println!("\n--- Parsing a board from string ---\n");
    let text = "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    if let Ok(board) = Board::from_string(text) {
        println!("Parsed: {board}");
        let solver = Solver::new();
        let mut rng = SimpleRng::new();
        match solver.solutions_flag(&board, &mut rng) {
            SolutionsFlag::None => println!("No solution"),
            SolutionsFlag::Unique => println!("Exactly one solution"),
            SolutionsFlag::Multiple => println!("Two or more solutions"),
        }
        if let Some(solution) = solver.solve(&board, &mut rng) {
            println!("Solved: {solution}");
        }
    }
}

//! Hydro System CLI
//!
//! Demonstration run of both optimizers on the worked examples:
//! a four-month reservoir operation problem and a three-user allocation
//! problem.

use hydro_system::{
    AllocationOptimizer, CurveDriver, ProblemSpec, ReservoirOptimizer, Stage,
};

fn main() {
    env_logger::init();

    println!("Hydro System v0.1.0");
    println!("===================\n");

    run_reservoir_example();
    run_allocation_example();
}

/// Four months of inflows, releases 0/10/20/30, capacity 50
fn run_reservoir_example() {
    let inflows = [20.0, 25.0, 30.0, 35.0];
    let spec = ProblemSpec::new(
        inflows.iter().map(|&f| Stage::with_inflow(f)).collect(),
        vec![0.0, 10.0, 20.0, 30.0],
        vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![5.0, 8.0, 6.0, 7.0],
            vec![12.0, 15.0, 10.0, 14.0],
            vec![18.0, 20.0, 16.0, 22.0],
        ],
        50.0,
    )
    .expect("example spec is well formed");

    println!("Reservoir operation ({} months, capacity {}):", spec.num_stages(), spec.capacity());

    let optimizer = ReservoirOptimizer::new(spec);
    match optimizer.solve() {
        Ok(result) => {
            println!("{:>6} {:>8} {:>8} {:>8} {:>8}", "Month", "Inflow", "Release", "Storage", "Benefit");
            println!("{}", "-".repeat(44));
            for row in &result.trace {
                println!(
                    "{:>6} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
                    row.stage_index + 1,
                    inflows[row.stage_index],
                    row.chosen_amount,
                    row.resulting_state,
                    row.stage_benefit,
                );
            }
            println!("\nTotal Benefit: {:.2}\n", result.total_benefit);
        }
        Err(err) => println!("No feasible schedule: {}\n", err),
    }
}

/// Three users, allocations 10/20/30, swept across budgets
fn run_allocation_example() {
    let spec = ProblemSpec::new(
        vec![Stage::user(), Stage::user(), Stage::user()],
        vec![10.0, 20.0, 30.0],
        vec![
            vec![5.0, 8.0, 6.0],
            vec![12.0, 15.0, 10.0],
            vec![18.0, 20.0, 16.0],
        ],
        30.0,
    )
    .expect("example spec is well formed");

    let num_users = spec.num_stages();
    println!("Water allocation ({} users):", num_users);

    let optimizer = AllocationOptimizer::new(spec);
    let driver = CurveDriver::with_optimizer(optimizer);
    match driver.run() {
        Ok(result) => {
            print!("{:>8} {:>12}", "Water", "Max Benefit");
            for user in 1..=num_users {
                print!(" {:>8}", format!("User {}", user));
            }
            println!();
            println!("{}", "-".repeat(22 + 9 * num_users));

            for point in &result.curve {
                print!("{:>8.1} {:>12.1}", point.budget, point.total_benefit);
                for row in &point.trace {
                    print!(" {:>8.1}", row.chosen_amount);
                }
                println!();
            }
            println!("\nBest at full supply: {:.2}", result.total_benefit);
        }
        Err(err) => println!("Sweep failed: {}", err),
    }
}

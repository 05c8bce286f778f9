mod common;
use common::rand_u;
use polygen::{Config, Generator, Preset};

fn main() {
    // A flat polynomial: nothing is allowed to nest.
    let config = Config {
        max_depth: 0,
        ..Preset::Poly.config()
    };
    let mut buf = [0; 4096];
    let mut u = rand_u(&mut buf);
    let expr: String = Generator::new(&config, &mut u).expression(1);
    println!("{}", expr);

    // A whole test case with declarations, plus the id of the path taken
    // through the grammar.
    let config = Config::default();
    let mut buf = [0; 4096];
    let mut u = rand_u(&mut buf);
    let (case, id): (String, u64) = Generator::new(&config, &mut u).case();
    println!("{:x}", id);
    print!("{}", case);
}

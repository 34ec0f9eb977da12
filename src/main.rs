use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    termgram::cli::main()
}

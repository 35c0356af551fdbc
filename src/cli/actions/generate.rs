use crate::credential::{self, TokenGenerator};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub entropy: usize,
    pub count: u16,
}

/// Print fresh tokens with their storage hash.
///
/// The token goes to the client, the hash goes to the server as
/// `--credential <user>=<hash>`.
/// # Errors
/// Returns an error if the random source fails.
pub fn execute(args: &Args) -> Result<()> {
    for (token, hash) in generate(args)? {
        println!("token: {token}");
        println!("hash:  {hash}");
    }
    Ok(())
}

fn generate(args: &Args) -> Result<Vec<(String, String)>> {
    let generator = TokenGenerator::new(args.entropy)?;
    (0..args.count)
        .map(|_| {
            let token = generator.generate()?;
            let hash = credential::hash(credential::decode(&token)?);
            Ok::<_, anyhow::Error>((token, hash))
        })
        .collect()
}

//! LINKAGE and CSV pedigree integration tests: file layouts, family
//! numbering, affection-code conventions and the CSV three-pass decode.

use std::fs;
use std::path::Path;

use popconv::io::csv::{read_csv, write_csv, CsvOptions};
use popconv::io::linkage::{write_linkage, LinkageOptions};
use popconv::{Chromosome, Locus, LocusIdx, PopType, Population, Sex, Subpopulation};

/// One subpopulation of 4 (two sibpairs) with a matching parental
/// generation; 1 chromosome, 2 loci at distances 1.0 and 5.0.
fn sibpair_pop() -> Population {
    let chrom = Chromosome::new(vec![
        Locus::with_distance("locus1_1", 1.0),
        Locus::with_distance("locus1_2", 5.0),
    ]);
    let mut pop = Population::with_layout(vec![chrom], &[4]);
    for i in 0..4 {
        let ind = pop.individual_mut(0, i);
        ind.sex = if i % 2 == 0 { Sex::Male } else { Sex::Female };
        ind.affected = i == 0;
        ind.set_allele_pair(LocusIdx::new(0), (i + 1) as u32, (i + 2) as u32);
        ind.set_allele_pair(LocusIdx::new(1), (i + 3) as u32, (i + 4) as u32);
    }
    let mut parents = Subpopulation::new(4, 2);
    for i in 0..4 {
        let ind = parents.individual_mut(i);
        ind.sex = if i % 2 == 0 { Sex::Male } else { Sex::Female };
        ind.set_allele_pair(LocusIdx::new(0), 5, 6);
        ind.set_allele_pair(LocusIdx::new(1), 7, 8);
    }
    pop.set_ancestral(vec![parents]).unwrap();
    pop.set_max_allele(12);
    pop
}

fn uniform_freqs(n_loci: usize) -> Vec<Vec<f64>> {
    vec![vec![0.0, 0.5, 0.5]; n_loci]
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn linkage_pre_layout() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("study");
    let opts = LinkageOptions {
        allele_freq: Some(uniform_freqs(2)),
        ..LinkageOptions::default()
    };
    write_linkage(&sibpair_pop(), &base, &opts).unwrap();

    let dat = read_lines(&dir.path().join("study.dat"));
    // 2 loci plus the synthetic affection-status locus
    assert_eq!(dat[0], "3 0 0 5 << nlocus, risklocus, sexlink, nprogram");
    assert_eq!(dat[1], "0 0 0 0 << mutsys, mutmale, mutfemale, disequil");
    assert_eq!(dat[3], "1 2 << affection status code, number of alleles");
    assert_eq!(dat[4], "0.999000 0.001000 << gene frequency");
    assert!(dat.iter().any(|l| l == "3 2 << numbered alleles code, total number of alleles"));
    assert!(dat.iter().any(|l| l == "0.500000 0.500000 << gene frequencies"));
    assert_eq!(dat.last().unwrap(), "1 0.1 0.1");

    let ped = read_lines(&dir.path().join("study.ped"));
    assert_eq!(ped.len(), 8);
    // family 1: parents 1-2, offspring 3-4; LINKAGE affection: 1=unaffected
    assert_eq!(ped[0], "  1 1 0 0 1 1 5 6 7 8");
    assert_eq!(ped[1], "  1 2 0 0 2 1 5 6 7 8");
    // first offspring is affected (code 2), linked dad=1 mom=2
    assert_eq!(ped[2], "  1 3 1 2 1 2 1 2 3 4");
    assert_eq!(ped[3], "  1 4 1 2 2 1 2 3 4 5");
    // second family
    assert!(ped[4].starts_with("  2 1 0 0"));
}

#[test]
fn linkage_makeped_layout_links_sibs() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("study");
    let opts = LinkageOptions {
        allele_freq: Some(uniform_freqs(2)),
        pre: false,
        ..LinkageOptions::default()
    };
    write_linkage(&sibpair_pop(), &base, &opts).unwrap();

    let ped = read_lines(&dir.path().join("study.ped"));
    // parents point at first offspring 3; proband flag on offspring 3 only
    assert_eq!(ped[0], "  1 1 0 0 3 0 0 1 0 1 5 6 7 8");
    assert_eq!(ped[2], "  1 3 1 2 0 4 4 1 1 2 1 2 3 4");
    assert_eq!(ped[3], "  1 4 1 2 0 0 0 2 0 1 2 3 4 5");
}

#[test]
fn linkage_excluded_locus_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("study");
    let opts = LinkageOptions {
        allele_freq: Some(uniform_freqs(2)),
        exclude: vec![LocusIdx::new(1)],
        ..LinkageOptions::default()
    };
    write_linkage(&sibpair_pop(), &base, &opts).unwrap();

    let dat = read_lines(&dir.path().join("study.dat"));
    assert_eq!(dat[0], "2 0 0 5 << nlocus, risklocus, sexlink, nprogram");
    let ped = read_lines(&dir.path().join("study.ped"));
    // one locus left: 6 pedigree fields + 2 alleles
    assert_eq!(ped[0], "  1 1 0 0 1 1 5 6");
}

#[test]
fn linkage_by_subpop_families_and_sex_collision() {
    let chrom = Chromosome::new(vec![Locus::with_distance("locus1_1", 1.0)]);
    let mut pop = Population::with_layout(vec![chrom], &[3, 2]);
    for sp in 0..2 {
        for i in 0..pop.subpop_size(sp) {
            pop.individual_mut(sp, i).set_allele_pair(LocusIdx::new(0), 1, 2);
        }
    }
    let mut par0 = Subpopulation::new(2, 1);
    par0.individual_mut(1).sex = Sex::Female;
    // both parents of subpopulation 1 are male: collision
    let par1 = Subpopulation::new(2, 1);
    pop.set_ancestral(vec![par0, par1]).unwrap();
    pop.set_max_allele(2);

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("fams");
    let opts = LinkageOptions {
        pop_type: PopType::BySubPop,
        allele_freq: Some(uniform_freqs(1)),
        ..LinkageOptions::default()
    };
    write_linkage(&pop, &base, &opts).unwrap();

    let ped = read_lines(&dir.path().join("fams.ped"));
    // 2 parents + 3 offspring, then 2 parents + 2 offspring
    assert_eq!(ped.len(), 9);
    assert!(ped[0].starts_with("  1 1 0 0 1"));
    assert!(ped[1].starts_with("  1 2 0 0 2"));
    // offspring members are 3..5 with dad=1 mom=2
    assert!(ped[2].starts_with("  1 3 1 2"));
    assert!(ped[4].starts_with("  1 5 1 2"));
    // family 2's second parent was flipped to female
    assert!(ped[6].starts_with("  2 2 0 0 2"));
}

#[test]
fn linkage_by_subpop_rejects_extra_parents() {
    let chrom = Chromosome::new(vec![Locus::with_distance("locus1_1", 1.0)]);
    let mut pop = Population::with_layout(vec![chrom], &[2]);
    pop.set_ancestral(vec![Subpopulation::new(3, 1)]).unwrap();
    pop.set_max_allele(1);

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("bad");
    let opts = LinkageOptions {
        pop_type: PopType::BySubPop,
        allele_freq: Some(uniform_freqs(1)),
        ..LinkageOptions::default()
    };
    let err = write_linkage(&pop, &base, &opts).unwrap_err();
    assert!(matches!(err, popconv::PopconvError::Structural { .. }));
    // fail-before-commit: no partial files
    assert!(!dir.path().join("bad.dat").exists());
    assert!(!dir.path().join("bad.ped").exists());
}

#[test]
fn csv_layout_and_affection_convention() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fam.csv");
    write_csv(&sibpair_pop(), &path, &CsvOptions::default()).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines[0], "Chromosome 1,,,,locus1_1,1,locus1_2,5");
    // CSV affection: 1=affected, 2=unaffected (opposite of LINKAGE)
    assert_eq!(lines[1], "  1,1,1,2,5,6,7,8");
    assert_eq!(lines[3], "  1,3,1,1,1,2,3,4");
    assert_eq!(lines.len(), 9);
}

#[test]
fn csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fam.csv");
    let pop = sibpair_pop();
    write_csv(&pop, &path, &CsvOptions::default()).unwrap();
    let loaded = read_csv(&path).unwrap();

    // family numbers become subpopulation indices; 0 stays an empty
    // placeholder so no family is numbered 0
    assert_eq!(loaded.num_subpops(), 3);
    assert_eq!(loaded.subpop_size(0), 0);
    assert_eq!(loaded.subpop_size(1), 2);
    assert_eq!(loaded.subpop_size(2), 2);
    assert_eq!(loaded.ancestral_subpop_size(1), 2);
    assert_eq!(loaded.max_allele(), 8);

    // offspring of family k are current-generation individuals 2(k-1), ...
    for fam in 1..=2usize {
        for o in 0..2 {
            let original = pop.individual(0, 2 * (fam - 1) + o);
            let decoded = loaded.individual(fam, o);
            for loc in 0..2usize {
                assert_eq!(
                    decoded.allele_pair(LocusIdx::from(loc)),
                    original.allele_pair(LocusIdx::from(loc))
                );
            }
            assert_eq!(decoded.sex, original.sex);
            assert_eq!(decoded.affected, original.affected);
        }
    }
}

#[test]
fn csv_decode_reorders_out_of_order_loci() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unordered.csv");
    // loci declared in reverse genetic order
    let content = "\
Chromosome 1,,,,locus1_2,5.0,locus1_1,1.0
  1,1,1,2,11,12,21,22
  1,2,2,2,13,14,23,24
  1,3,1,1,15,16,25,26
  1,4,2,1,17,18,27,28
";
    fs::write(&path, content).unwrap();
    let loaded = read_csv(&path).unwrap();

    let names: Vec<&str> = loaded.loci().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["locus1_1", "locus1_2"]);
    assert_eq!(loaded.locus(LocusIdx::new(0)).distance, Some(1.0));
    assert_eq!(loaded.locus(LocusIdx::new(1)).distance, Some(5.0));

    // genotype columns are permuted to genetic order: the first parent's
    // declared columns were locus1_2=(11,12), locus1_1=(21,22)
    let parent = loaded.ancestral_subpop(1).unwrap().individual(0);
    assert_eq!(parent.allele_pair(LocusIdx::new(0)), (21, 22));
    assert_eq!(parent.allele_pair(LocusIdx::new(1)), (11, 12));
    // member 3 is the first offspring
    let off = loaded.individual(1, 0);
    assert_eq!(off.allele_pair(LocusIdx::new(0)), (25, 26));
    assert_eq!(off.allele_pair(LocusIdx::new(1)), (15, 16));
    assert!(off.affected);
    assert_eq!(loaded.max_allele(), 28);
}

#[test]
fn csv_decode_fills_family_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaps.csv");
    let content = "\
Chromosome 1,,,,l1,1.0
  1,1,1,2,3,4
  1,3,1,1,5,6
  4,1,2,2,7,8
  4,3,2,1,1,2
";
    fs::write(&path, content).unwrap();
    let loaded = read_csv(&path).unwrap();
    assert_eq!(loaded.num_subpops(), 5);
    assert_eq!(loaded.subpop_size(2), 0);
    assert_eq!(loaded.subpop_size(3), 0);
    assert_eq!(loaded.subpop_size(4), 1);
    assert_eq!(loaded.ancestral_subpop_size(4), 1);
}

#[test]
fn csv_decode_rejects_short_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    let content = "\
Chromosome 1,,,,l1,1.0,l2,2.0
  1,1,1,2,3,4
";
    fs::write(&path, content).unwrap();
    let err = read_csv(&path).unwrap_err();
    assert!(matches!(err, popconv::PopconvError::Parse { line: 2, .. }));
}

#[test]
fn csv_decode_rejects_bad_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Chromosome 1,,,,l1\n").unwrap();
    let err = read_csv(&path).unwrap_err();
    assert!(matches!(err, popconv::PopconvError::Parse { line: 1, .. }));
}
